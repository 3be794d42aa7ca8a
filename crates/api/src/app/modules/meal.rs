//! Meals module.
//!
//! Mounted last by `ModuleRegistry::new`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{Router, routing::get};
use hotpot_core::{HealthCheck, ServiceResult};

use super::{Module, ping};

#[derive(Debug, Default, Clone, Copy)]
pub struct MealService;

impl MealService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthCheck for MealService {
    async fn ping(&self) -> ServiceResult<bool> {
        Ok(true)
    }
}

pub struct MealModule {
    service: Arc<MealService>,
}

impl Default for MealModule {
    fn default() -> Self {
        Self::new()
    }
}

impl MealModule {
    pub fn new() -> Self {
        Self {
            service: Arc::new(MealService::new()),
        }
    }
}

impl Module for MealModule {
    fn name(&self) -> &str {
        "meal-module"
    }

    fn resource(&self) -> &str {
        "meal"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/ping", get(ping::<MealService>))
            .with_state(self.service.clone())
    }
}
