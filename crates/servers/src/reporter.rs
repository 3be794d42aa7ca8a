//! Sink for per-server lifecycle failures.

use crate::error::ServerError;
use crate::manager::Phase;

/// Receives one call per failed `start`/`stop`.
///
/// Injected into the manager so tests can observe failures without a
/// subscriber.
pub trait Reporter: Send + Sync {
    fn server_failed(&self, phase: Phase, index: usize, name: &str, error: &ServerError);
}

/// Default reporter: one `tracing` error record per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn server_failed(&self, phase: Phase, index: usize, name: &str, error: &ServerError) {
        tracing::error!(
            phase = %phase,
            server = name,
            index,
            error = %error,
            "server failed to {phase}"
        );
    }
}
