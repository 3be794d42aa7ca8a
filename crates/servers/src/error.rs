//! Lifecycle error model.

use thiserror::Error;

use crate::manager::ManagerState;

/// Failure of a single server's `start` or `stop`.
///
/// These never abort a batch operation; the manager records them in the
/// `LifecycleReport` and hands them to its `Reporter`.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// `start` was called while the server was already starting or running.
    #[error("server is already running")]
    AlreadyRunning,

    /// The serve loop ended with an I/O error.
    #[error("serve loop failed: {0}")]
    Serve(#[source] std::io::Error),

    /// The task driving a lifecycle call panicked or was cancelled.
    #[error("lifecycle task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Misuse of the manager itself (invalid state transition).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("cannot {action} while manager is {state}")]
    InvalidTransition {
        action: &'static str,
        state: ManagerState,
    },
}
