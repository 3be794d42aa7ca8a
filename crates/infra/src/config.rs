//! Application configuration.
//!
//! Built once in `main` from the environment and passed down explicitly.

use hotpot_observability::{LogLevel, LogLevelError};
use thiserror::Error;

const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("HTTP_PORT must be a port number, got {value:?}")]
    InvalidPort { value: String },

    #[error("LOG_LEVEL is invalid: {0}")]
    InvalidLogLevel(#[from] LogLevelError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub http_host: String,
    pub http_port: u16,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            log_level: LogLevel::default(),
        }
    }
}

impl AppConfig {
    /// Read `HTTP_HOST`, `HTTP_PORT` and `LOG_LEVEL`, falling back to defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let http_host = lookup("HTTP_HOST").unwrap_or(defaults.http_host);

        let http_port = match lookup("HTTP_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value })?,
            None => defaults.http_port,
        };

        let log_level = match lookup("LOG_LEVEL") {
            Some(value) => value.parse()?,
            None => defaults.log_level,
        };

        Ok(Self {
            http_host,
            http_port,
            log_level,
        })
    }

    /// `host:port` for the HTTP listener.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
