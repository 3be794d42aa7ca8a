//! `hotpot-core` — service-layer building blocks shared by every module.
//!
//! This crate contains **no transport concerns**: HTTP wiring lives in
//! `hotpot-api`, listener lifecycle in `hotpot-servers`.

pub mod error;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use service::HealthCheck;
