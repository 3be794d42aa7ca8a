//! Fleet lifecycle: concurrent start, ordered stop, per-server failure
//! isolation.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{LifecycleError, ServerError};
use crate::reporter::{Reporter, TracingReporter};
use crate::server::Server;

/// Where the manager is in its single-use lifecycle.
///
/// `Idle → Starting → Running → Stopping → Stopped`; no other transition is
/// accepted. A `start_all` dropped mid-flight lands in `Running`, a dropped
/// `stop_all` falls back to `Running` so it can be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ManagerState::Idle => "idle",
            ManagerState::Starting => "starting",
            ManagerState::Running => "running",
            ManagerState::Stopping => "stopping",
            ManagerState::Stopped => "stopped",
        })
    }
}

/// Which lifecycle call an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Stop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Start => "start",
            Phase::Stop => "stop",
        })
    }
}

/// Result of one server's `start` or `stop`.
#[derive(Debug)]
pub struct ServerOutcome {
    /// Registration index (duplicates get distinct indices).
    pub index: usize,
    pub name: String,
    pub result: Result<(), ServerError>,
}

impl ServerOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-server outcomes of a batch call, in registration order.
#[derive(Debug)]
pub struct LifecycleReport {
    phase: Phase,
    outcomes: Vec<ServerOutcome>,
}

impl LifecycleReport {
    fn new(phase: Phase, outcomes: Vec<ServerOutcome>) -> Self {
        Self { phase, outcomes }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcomes(&self) -> &[ServerOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<ServerOutcome> {
        self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// `true` when every server succeeded (vacuously true when empty).
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ServerOutcome::is_ok)
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ServerOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

/// Starts a set of servers concurrently and stops them in registration order.
///
/// A failing server never prevents the others from starting or stopping: its
/// error is handed to the `Reporter` and recorded in the returned
/// `LifecycleReport`. Only misuse of the manager (starting twice, stopping
/// before starting, registering after start) is returned as an `Err`.
pub struct ServerManager {
    servers: Vec<Arc<dyn Server>>,
    state: Mutex<ManagerState>,
    reporter: Arc<dyn Reporter>,
}

impl Default for ServerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerManager")
            .field("servers", &self.servers.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("state", &self.state())
            .finish()
    }
}

impl ServerManager {
    /// Empty manager reporting failures through `tracing`.
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(TracingReporter))
    }

    pub fn with_reporter(reporter: Arc<dyn Reporter>) -> Self {
        Self {
            servers: Vec::new(),
            state: Mutex::new(ManagerState::Idle),
            reporter,
        }
    }

    /// Append a server. The same instance may be added more than once; each
    /// registration gets its own start and stop call.
    pub fn add_server(&mut self, server: Arc<dyn Server>) -> Result<(), LifecycleError> {
        let state = *self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        if state != ManagerState::Idle {
            return Err(LifecycleError::InvalidTransition {
                action: "add a server",
                state,
            });
        }
        self.servers.push(server);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn state(&self) -> ManagerState {
        *self.lock_state()
    }

    /// Start every server concurrently and wait for all start attempts.
    ///
    /// Each `start` runs on its own tokio task; a panic is recorded as
    /// `ServerError::Task`. Returns once the slowest start has returned.
    pub async fn start_all(&self) -> Result<LifecycleReport, LifecycleError> {
        // Dropping this future (e.g. an external timeout) still lands in
        // `Running`: the start tasks are already spawned and must be stoppable.
        let transition = self.begin(
            "start servers",
            ManagerState::Idle,
            ManagerState::Starting,
            ManagerState::Running,
        )?;
        tracing::info!(count = self.servers.len(), "starting servers");

        let handles: Vec<_> = self
            .servers
            .iter()
            .map(|server| {
                let server = Arc::clone(server);
                tokio::spawn(async move { server.start().await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (index, (server, handle)) in self.servers.iter().zip(handles).enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ServerError::Task(e.to_string())),
            };
            outcomes.push(self.record(Phase::Start, index, server.as_ref(), result));
        }

        transition.complete(ManagerState::Running);

        let report = LifecycleReport::new(Phase::Start, outcomes);
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.len() - report.succeeded(),
            "server start finished"
        );
        Ok(report)
    }

    /// Stop every server one at a time, in registration order.
    ///
    /// Each `stop` completes before the next begins. Servers whose start
    /// failed are still asked to stop.
    pub async fn stop_all(&self) -> Result<LifecycleReport, LifecycleError> {
        // Cancelled midway, the manager returns to `Running` so `stop_all` can
        // be retried and the remaining servers still get a stop attempt.
        let transition = self.begin(
            "stop servers",
            ManagerState::Running,
            ManagerState::Stopping,
            ManagerState::Running,
        )?;
        tracing::info!(count = self.servers.len(), "stopping servers");

        let mut outcomes = Vec::with_capacity(self.servers.len());
        for (index, server) in self.servers.iter().enumerate() {
            let task = {
                let server = Arc::clone(server);
                tokio::spawn(async move { server.stop().await })
            };
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(ServerError::Task(e.to_string())),
            };
            outcomes.push(self.record(Phase::Stop, index, server.as_ref(), result));
        }

        transition.complete(ManagerState::Stopped);

        let report = LifecycleReport::new(Phase::Stop, outcomes);
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.len() - report.succeeded(),
            "server stop finished"
        );
        Ok(report)
    }

    fn begin(
        &self,
        action: &'static str,
        from: ManagerState,
        to: ManagerState,
        on_cancel: ManagerState,
    ) -> Result<Transition<'_>, LifecycleError> {
        let mut state = self.lock_state();
        if *state != from {
            return Err(LifecycleError::InvalidTransition {
                action,
                state: *state,
            });
        }
        *state = to;
        Ok(Transition {
            state: &self.state,
            action,
            on_cancel: Some(on_cancel),
        })
    }

    fn record(
        &self,
        phase: Phase,
        index: usize,
        server: &dyn Server,
        result: Result<(), ServerError>,
    ) -> ServerOutcome {
        match &result {
            Ok(()) => tracing::debug!(phase = %phase, server = server.name(), index, "ok"),
            Err(e) => self.reporter.server_failed(phase, index, server.name(), e),
        }
        ServerOutcome {
            index,
            name: server.name().to_string(),
            result,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ManagerState> {
        // The guarded value is a plain enum; a poisoned lock still holds a valid state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// In-flight state change. Commits `on_cancel` if dropped before
/// [`Transition::complete`].
struct Transition<'a> {
    state: &'a Mutex<ManagerState>,
    action: &'static str,
    on_cancel: Option<ManagerState>,
}

impl Transition<'_> {
    fn complete(mut self, to: ManagerState) {
        self.on_cancel = None;
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        if let Some(to) = self.on_cancel.take() {
            tracing::warn!(action = self.action, state = %to, "lifecycle call cancelled");
            *self.state.lock().unwrap_or_else(|e| e.into_inner()) = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use proptest::prelude::*;

    use super::*;

    type StopLog = Arc<Mutex<Vec<String>>>;

    /// Spy server: counts calls, optionally sleeps or fails.
    struct Spy {
        name: String,
        start_delay: Duration,
        stop_delay: Duration,
        fail_start: bool,
        fail_stop: bool,
        starts: AtomicUsize,
        stops: AtomicUsize,
        stop_log: Option<StopLog>,
    }

    impl Spy {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                start_delay: Duration::ZERO,
                stop_delay: Duration::ZERO,
                fail_start: false,
                fail_stop: false,
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                stop_log: None,
            }
        }

        fn start_delay(mut self, d: Duration) -> Self {
            self.start_delay = d;
            self
        }

        fn stop_delay(mut self, d: Duration) -> Self {
            self.stop_delay = d;
            self
        }

        fn failing_start(mut self) -> Self {
            self.fail_start = true;
            self
        }

        fn failing_stop(mut self) -> Self {
            self.fail_stop = true;
            self
        }

        fn logging_to(mut self, log: &StopLog) -> Self {
            self.stop_log = Some(log.clone());
            self
        }

        fn starts(&self) -> usize {
            self.starts.load(Ordering::SeqCst)
        }

        fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Server for Spy {
        fn name(&self) -> &str {
            &self.name
        }

        async fn start(&self) -> Result<(), ServerError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.start_delay).await;
            if self.fail_start {
                return Err(anyhow::anyhow!("{} refused to start", self.name).into());
            }
            Ok(())
        }

        async fn stop(&self) -> Result<(), ServerError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.stop_delay).await;
            if let Some(log) = &self.stop_log {
                log.lock().unwrap().push(self.name.clone());
            }
            if self.fail_stop {
                return Err(anyhow::anyhow!("{} refused to stop", self.name).into());
            }
            Ok(())
        }
    }

    struct Panics;

    #[async_trait]
    impl Server for Panics {
        async fn start(&self) -> Result<(), ServerError> {
            panic!("start exploded");
        }

        async fn stop(&self) -> Result<(), ServerError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        failures: Mutex<Vec<(Phase, usize, String)>>,
    }

    impl Reporter for RecordingReporter {
        fn server_failed(&self, phase: Phase, index: usize, name: &str, _error: &ServerError) {
            self.failures
                .lock()
                .unwrap()
                .push((phase, index, name.to_string()));
        }
    }

    impl RecordingReporter {
        fn failures(&self) -> Vec<(Phase, usize, String)> {
            self.failures.lock().unwrap().clone()
        }
    }

    fn manager_with(servers: &[Arc<Spy>]) -> (ServerManager, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::default());
        let mut manager = ServerManager::with_reporter(reporter.clone());
        for s in servers {
            manager.add_server(s.clone()).unwrap();
        }
        (manager, reporter)
    }

    #[tokio::test]
    async fn empty_manager_starts_and_stops() {
        let manager = ServerManager::new();
        assert!(manager.is_empty());

        let started = manager.start_all().await.unwrap();
        assert!(started.is_empty());
        assert!(started.is_success());

        let stopped = manager.stop_all().await.unwrap();
        assert!(stopped.is_empty());
        assert_eq!(manager.state(), ManagerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn start_all_runs_starts_concurrently() {
        let servers = [
            Arc::new(Spy::new("a").start_delay(Duration::from_millis(100))),
            Arc::new(Spy::new("b").start_delay(Duration::from_millis(300))),
            Arc::new(Spy::new("c").start_delay(Duration::from_millis(200))),
        ];
        let (manager, _) = manager_with(&servers);

        let began = tokio::time::Instant::now();
        let report = manager.start_all().await.unwrap();
        let elapsed = began.elapsed();

        assert!(report.is_success());
        assert!(servers.iter().all(|s| s.starts() == 1));
        assert!(elapsed >= Duration::from_millis(300), "returned before slowest: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "starts ran sequentially: {elapsed:?}");
    }

    #[tokio::test]
    async fn stop_all_follows_registration_order() {
        let log = StopLog::default();
        let servers = [
            Arc::new(Spy::new("a").stop_delay(Duration::from_millis(30)).logging_to(&log)),
            Arc::new(Spy::new("b").stop_delay(Duration::from_millis(10)).logging_to(&log)),
            Arc::new(Spy::new("c").logging_to(&log)),
        ];
        let (manager, _) = manager_with(&servers);

        manager.start_all().await.unwrap();
        let report = manager.stop_all().await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        let names: Vec<_> = report.outcomes().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(report.phase(), Phase::Stop);
    }

    #[tokio::test]
    async fn start_failure_does_not_block_siblings() {
        let servers = [
            Arc::new(Spy::new("a")),
            Arc::new(Spy::new("b").failing_start()),
            Arc::new(Spy::new("c")),
        ];
        let (manager, reporter) = manager_with(&servers);

        let report = manager.start_all().await.unwrap();

        assert!(servers.iter().all(|s| s.starts() == 1));
        assert_eq!(report.succeeded(), 2);
        let failed: Vec<_> = report.failures().map(|o| (o.index, o.name.as_str())).collect();
        assert_eq!(failed, vec![(1, "b")]);
        assert_eq!(reporter.failures(), vec![(Phase::Start, 1, "b".to_string())]);
        assert_eq!(manager.state(), ManagerState::Running);

        // The failed server is still part of the shutdown.
        manager.stop_all().await.unwrap();
        assert!(servers.iter().all(|s| s.stops() == 1));
    }

    #[tokio::test]
    async fn stop_failure_does_not_halt_iteration() {
        let servers = [
            Arc::new(Spy::new("a").failing_stop()),
            Arc::new(Spy::new("b")),
            Arc::new(Spy::new("c")),
        ];
        let (manager, reporter) = manager_with(&servers);

        manager.start_all().await.unwrap();
        let report = manager.stop_all().await.unwrap();

        assert!(servers.iter().all(|s| s.stops() == 1));
        assert_eq!(report.len(), 3);
        assert!(!report.is_success());
        assert_eq!(reporter.failures(), vec![(Phase::Stop, 0, "a".to_string())]);
        assert_eq!(manager.state(), ManagerState::Stopped);
    }

    #[tokio::test]
    async fn same_instance_registered_twice_is_driven_twice() {
        let spy = Arc::new(Spy::new("dup"));
        let (manager, _) = manager_with(&[spy.clone(), spy.clone()]);
        assert_eq!(manager.len(), 2);

        let started = manager.start_all().await.unwrap();
        manager.stop_all().await.unwrap();

        assert_eq!(spy.starts(), 2);
        assert_eq!(spy.stops(), 2);
        let indices: Vec<_> = started.outcomes().iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[tokio::test]
    async fn panicking_start_is_recorded_as_task_failure() {
        let reporter = Arc::new(RecordingReporter::default());
        let mut manager = ServerManager::with_reporter(reporter.clone());
        manager.add_server(Arc::new(Panics)).unwrap();
        manager.add_server(Arc::new(Spy::new("ok"))).unwrap();

        let report = manager.start_all().await.unwrap();

        let outcome = &report.outcomes()[0];
        assert!(matches!(outcome.result, Err(ServerError::Task(_))));
        assert!(outcome.name.ends_with("Panics"), "default name is the type name: {}", outcome.name);
        assert!(report.outcomes()[1].is_ok());
        assert_eq!(reporter.failures().len(), 1);
    }

    #[tokio::test]
    async fn invalid_transitions_are_rejected() {
        let mut manager = ServerManager::new();

        let err = manager.stop_all().await.unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                action: "stop servers",
                state: ManagerState::Idle
            }
        );

        manager.start_all().await.unwrap();
        assert!(matches!(
            manager.start_all().await,
            Err(LifecycleError::InvalidTransition { state: ManagerState::Running, .. })
        ));
        assert!(manager.add_server(Arc::new(Spy::new("late"))).is_err());
        assert!(manager.is_empty());

        manager.stop_all().await.unwrap();
        let err = manager.stop_all().await.unwrap_err();
        assert_eq!(err.to_string(), "cannot stop servers while manager is stopped");
    }

    #[tokio::test(start_paused = true)]
    async fn start_all_cut_short_by_timeout_still_allows_stop() {
        let servers = [
            Arc::new(Spy::new("fast").start_delay(Duration::from_millis(1))),
            Arc::new(Spy::new("slow").start_delay(Duration::from_millis(500))),
        ];
        let (manager, _) = manager_with(&servers);

        let timed_out = tokio::time::timeout(Duration::from_millis(50), manager.start_all()).await;
        assert!(timed_out.is_err());
        assert_eq!(manager.state(), ManagerState::Running);

        // The detached start of "slow" still completes.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(servers.iter().all(|s| s.starts() == 1));

        let report = manager.stop_all().await.unwrap();
        assert_eq!(report.len(), 2);
        assert!(servers.iter().all(|s| s.stops() == 1));
        assert_eq!(manager.state(), ManagerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_all_cut_short_by_timeout_can_be_retried() {
        let servers = [
            Arc::new(Spy::new("a").stop_delay(Duration::from_millis(10))),
            Arc::new(Spy::new("b").stop_delay(Duration::from_millis(200))),
            Arc::new(Spy::new("c")),
        ];
        let (manager, _) = manager_with(&servers);
        manager.start_all().await.unwrap();

        let timed_out = tokio::time::timeout(Duration::from_millis(50), manager.stop_all()).await;
        assert!(timed_out.is_err());
        assert_eq!(manager.state(), ManagerState::Running);
        assert_eq!(servers[2].stops(), 0);

        let report = manager.stop_all().await.unwrap();
        assert_eq!(report.len(), 3);
        assert_eq!(servers[2].stops(), 1);
        assert!(servers.iter().all(|s| s.stops() >= 1));
        assert_eq!(manager.state(), ManagerState::Stopped);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            ..ProptestConfig::default()
        })]

        /// Property: stop order equals registration order whatever each stop costs.
        #[test]
        fn stop_order_is_registration_order(delays in prop::collection::vec(0u64..4, 1..6)) {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();

            let log = StopLog::default();
            let servers: Vec<_> = delays
                .iter()
                .enumerate()
                .map(|(i, ms)| {
                    Arc::new(
                        Spy::new(&format!("s{i}"))
                            .stop_delay(Duration::from_millis(*ms))
                            .logging_to(&log),
                    )
                })
                .collect();
            let (manager, _) = manager_with(&servers);

            rt.block_on(async {
                manager.start_all().await.unwrap();
                manager.stop_all().await.unwrap();
            });

            let expected: Vec<_> = (0..delays.len()).map(|i| format!("s{i}")).collect();
            prop_assert_eq!(log.lock().unwrap().clone(), expected);
        }
    }
}
