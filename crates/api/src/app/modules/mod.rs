//! Business modules.
//!
//! A module owns a service and mounts its routes under
//! `/{name}/api/{version}/{resource}`; e.g. the auth module answers
//! `GET /auth-module/api/v1/auth/ping`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response, Router};
use hotpot_core::HealthCheck;

use crate::app::response::{self, CustomCode};

pub mod auth;
pub mod diet;
pub mod meal;
pub mod user;

pub use auth::{AuthModule, AuthService};
pub use diet::{DietModule, DietService};
pub use meal::{MealModule, MealService};
pub use user::{UserModule, UserService};

pub const PING_FAILED_MESSAGE: &str = "Something went wrong!";

pub trait Module: Send + Sync {
    /// Module name, first path segment (e.g. `auth-module`).
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "v1"
    }

    /// Resource segment after the version (e.g. `auth`).
    fn resource(&self) -> &str;

    /// Routes relative to [`Module::prefix`].
    fn routes(&self) -> Router;

    fn prefix(&self) -> String {
        format!("/{}/api/{}/{}", self.name(), self.version(), self.resource())
    }
}

/// Ping controller shared by every module: `200` envelope with the service's
/// answer, or `400` with `CustomCode::InternalError` when the service fails.
pub async fn ping<S: HealthCheck + 'static>(State(service): State<Arc<S>>) -> Response {
    match service.ping().await {
        Ok(alive) => response::success(alive),
        Err(e) => {
            tracing::warn!(error = %e, "ping failed");
            response::failure(
                StatusCode::BAD_REQUEST,
                CustomCode::InternalError,
                PING_FAILED_MESSAGE,
            )
        }
    }
}

/// Ordered set of modules mounted by the router.
pub struct ModuleRegistry {
    modules: Vec<Box<dyn Module>>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    /// Registry with the built-in modules: auth, user, diet, meal.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(AuthModule::new()));
        registry.register(Box::new(UserModule::new()));
        registry.register(Box::new(DietModule::new()));
        registry.register(Box::new(MealModule::new()));
        registry
    }

    pub fn empty() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    pub fn register(&mut self, module: Box<dyn Module>) {
        self.modules.push(module);
    }

    pub fn modules(&self) -> impl Iterator<Item = &(dyn Module + 'static)> {
        self.modules.iter().map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Nest every module under its prefix.
    pub fn router(&self) -> Router {
        self.modules().fold(Router::new(), |router, module| {
            let prefix = module.prefix();
            tracing::debug!(module = module.name(), %prefix, "mounting module");
            router.nest(&prefix, module.routes())
        })
    }
}
