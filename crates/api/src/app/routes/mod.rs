
use axum::{Router, routing::get};

use crate::app::modules::ModuleRegistry;

pub mod system;

/// `/health` plus every registered module under its prefix.
pub fn router(registry: &ModuleRegistry) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(registry.router())
}
