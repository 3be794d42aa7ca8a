use std::sync::Arc;

use async_trait::async_trait;
use axum::{Router, routing::get};
use hotpot_core::{HealthCheck, ServiceResult};

use super::{Module, ping};

#[derive(Debug, Default, Clone, Copy)]
pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthCheck for UserService {
    async fn ping(&self) -> ServiceResult<bool> {
        Ok(true)
    }
}

pub struct UserModule {
    service: Arc<UserService>,
}

impl Default for UserModule {
    fn default() -> Self {
        Self::new()
    }
}

impl UserModule {
    pub fn new() -> Self {
        Self {
            service: Arc::new(UserService::new()),
        }
    }
}

impl Module for UserModule {
    fn name(&self) -> &str {
        "user-module"
    }

    fn resource(&self) -> &str {
        "user"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/ping", get(ping::<UserService>))
            .with_state(self.service.clone())
    }
}
