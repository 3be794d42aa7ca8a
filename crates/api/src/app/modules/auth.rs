//! Authentication module.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{Router, routing::get};
use hotpot_core::{HealthCheck, ServiceResult};

use super::{Module, ping};

/// No credentials are checked yet; the service only answers health checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthService;

impl AuthService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthCheck for AuthService {
    async fn ping(&self) -> ServiceResult<bool> {
        Ok(true)
    }
}

pub struct AuthModule {
    service: Arc<AuthService>,
}

impl Default for AuthModule {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthModule {
    pub fn new() -> Self {
        Self {
            service: Arc::new(AuthService::new()),
        }
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth-module"
    }

    fn resource(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/ping", get(ping::<AuthService>))
            .with_state(self.service.clone())
    }
}
