//! Service error model.

use thiserror::Error;

/// Result type used across the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level error.
///
/// Controllers map every variant onto the same failure envelope; the variant
/// only matters for logging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A dependency the service needs is not reachable.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Anything else that went wrong inside the service.
    #[error("internal service error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
