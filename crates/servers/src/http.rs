//! axum adapter for the `Server` contract.
//!
//! `start` binds the listener and hands the accept loop to a tokio task, so it
//! returns as soon as the socket is listening. `stop` triggers axum's graceful
//! shutdown and waits for the serve loop to drain.

use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ServerError;
use crate::server::Server;

enum State {
    Idle,
    Starting,
    Running(Running),
}

struct Running {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    serve: JoinHandle<std::io::Result<()>>,
}

/// HTTP listener serving an axum `Router`.
pub struct HttpServer {
    name: String,
    addr: String,
    router: Router,
    state: Mutex<State>,
}

impl HttpServer {
    /// `addr` is anything `TcpListener::bind` accepts, e.g. `0.0.0.0:8080`.
    /// Port `0` picks an ephemeral port; read it back with [`local_addr`].
    ///
    /// [`local_addr`]: HttpServer::local_addr
    pub fn new(name: impl Into<String>, addr: impl Into<String>, router: Router) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
            router,
            state: Mutex::new(State::Idle),
        }
    }

    /// Configured bind address.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Address actually bound, while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.lock_state() {
            State::Running(running) => Some(running.local_addr),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lock_state(), State::Running(_))
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Server for HttpServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), ServerError> {
        {
            let mut state = self.lock_state();
            if !matches!(*state, State::Idle) {
                return Err(ServerError::AlreadyRunning);
            }
            *state = State::Starting;
        }

        let bound = match TcpListener::bind(&self.addr).await {
            Ok(listener) => listener.local_addr().map(|addr| (listener, addr)),
            Err(e) => Err(e),
        };
        let (listener, local_addr) = match bound {
            Ok(bound) => bound,
            Err(source) => {
                *self.lock_state() = State::Idle;
                return Err(ServerError::Bind {
                    addr: self.addr.clone(),
                    source,
                });
            }
        };

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone().cancelled_owned();
        let router = self.router.clone();
        let serve = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(signal)
                .await
        });

        tracing::info!(server = %self.name, addr = %local_addr, "http server listening");
        *self.lock_state() = State::Running(Running {
            local_addr,
            shutdown,
            serve,
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServerError> {
        let running = {
            let mut state = self.lock_state();
            match std::mem::replace(&mut *state, State::Idle) {
                State::Running(running) => Some(running),
                other => {
                    *state = other;
                    None
                }
            }
        };
        let Some(running) = running else {
            tracing::debug!(server = %self.name, "http server not running, nothing to stop");
            return Ok(());
        };

        tracing::info!(server = %self.name, addr = %running.local_addr, "http server stopping");
        running.shutdown.cancel();
        match running.serve.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ServerError::Serve(e)),
            Err(e) => Err(ServerError::Task(e.to_string())),
        }
    }
}
