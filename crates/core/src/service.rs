//! Capabilities implemented by module services.

use async_trait::async_trait;

use crate::error::ServiceResult;

/// Health-check capability.
///
/// Every module service answers `ping`; the module's controller exposes it
/// under `{prefix}/ping`.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> ServiceResult<bool>;
}

#[async_trait]
impl<T: HealthCheck + ?Sized> HealthCheck for std::sync::Arc<T> {
    async fn ping(&self) -> ServiceResult<bool> {
        (**self).ping().await
    }
}
