//! Infrastructure layer: configuration and external service clients.

pub mod config;
pub mod transport;

pub use config::{AppConfig, ConfigError};
pub use transport::{
    HttpTransport, Transport, TransportError, TransportKind, create_transport, map_response,
};
