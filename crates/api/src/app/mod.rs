//! HTTP API application wiring (Axum router).
//!
//! - `modules/`: one file per business module (service + ping controller)
//! - `routes/`: router assembly and system endpoints
//! - `response.rs`: the JSON envelope every module responds with

use axum::Router;

pub mod modules;
pub mod response;
pub mod routes;

pub use modules::{Module, ModuleRegistry};

/// Build the full HTTP router with the default modules (used by `main.rs`).
pub fn build_app() -> Router {
    build_app_with(&ModuleRegistry::new())
}

/// Build the HTTP router for a caller-assembled set of modules.
pub fn build_app_with(registry: &ModuleRegistry) -> Router {
    routes::router(registry)
}
