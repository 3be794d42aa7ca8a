//! Outbound service-to-service transport.
//!
//! `Transport` is the seam; `HttpTransport` is the only implementation.
//! Payloads are JSON values so the trait stays object-safe; they go over the
//! wire as JSON or XML depending on the content type. Use
//! [`map_response`] to turn a response into a typed DTO.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub mod http;

pub use http::HttpTransport;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_XML: &str = "application/xml";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode xml payload: {0}")]
    XmlEncode(#[from] quick_xml::se::SeError),

    #[error("failed to decode xml payload: {0}")]
    XmlDecode(#[from] quick_xml::de::DeError),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` to `path` (relative to the transport's base address).
    ///
    /// `content_type` defaults to JSON when `None`; XML is also accepted.
    async fn send(
        &self,
        method: Method,
        path: &str,
        request: &Value,
        content_type: Option<&str>,
    ) -> Result<Value, TransportError>;
}

/// Available transport implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Http,
}

pub fn create_transport(
    kind: TransportKind,
    address: impl Into<String>,
) -> Result<Box<dyn Transport>, TransportError> {
    match kind {
        TransportKind::Http => Ok(Box::new(HttpTransport::new(address)?)),
    }
}

/// Map a generic JSON response onto a typed structure.
pub fn map_response<T: DeserializeOwned>(response: &Value) -> Result<T, TransportError> {
    Ok(T::deserialize(response)?)
}
