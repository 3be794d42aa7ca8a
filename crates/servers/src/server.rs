use async_trait::async_trait;

use crate::error::ServerError;

/// A network-facing listener the `ServerManager` can drive.
///
/// # Contract
///
/// - `start` returns once the server accepts traffic. The accept loop must be
///   handed to a background task; a `start` that never returns keeps
///   `ServerManager::start_all` from ever returning.
/// - `stop` is safe to call when the server was never started or its start
///   failed; it returns `Ok(())` in that case.
/// - Both take `&self`: one instance may be registered more than once, and
///   each server synchronizes its own state.
#[async_trait]
pub trait Server: Send + Sync {
    /// Identity used in logs and lifecycle reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn start(&self) -> Result<(), ServerError>;

    async fn stop(&self) -> Result<(), ServerError>;
}
