//! Diet plans module.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{Router, routing::get};
use hotpot_core::{HealthCheck, ServiceResult};

use super::{Module, ping};

#[derive(Debug, Default, Clone, Copy)]
pub struct DietService;

impl DietService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthCheck for DietService {
    async fn ping(&self) -> ServiceResult<bool> {
        Ok(true)
    }
}

pub struct DietModule {
    service: Arc<DietService>,
}

impl Default for DietModule {
    fn default() -> Self {
        Self::new()
    }
}

impl DietModule {
    pub fn new() -> Self {
        Self {
            service: Arc::new(DietService::new()),
        }
    }
}

impl Module for DietModule {
    fn name(&self) -> &str {
        "diet-module"
    }

    fn resource(&self) -> &str {
        "diet"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/ping", get(ping::<DietService>))
            .with_state(self.service.clone())
    }
}
