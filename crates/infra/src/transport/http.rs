//! HTTP transport backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::{CONTENT_TYPE_JSON, CONTENT_TYPE_XML, Transport, TransportError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Root element name for XML request bodies.
const XML_ROOT: &str = "request";

#[derive(Debug, Clone)]
pub struct HttpTransport {
    address: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// `address` is the base URL, e.g. `http://localhost:8080`.
    ///
    /// Fails if the underlying client (30 s timeout) cannot be built.
    pub fn new(address: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(address, client))
    }

    pub fn with_client(address: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            address: address.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Wire encoding selected by the request's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload {
    Json,
    Xml,
}

impl Payload {
    fn for_content_type(content_type: &str) -> Result<Self, TransportError> {
        match content_type {
            CONTENT_TYPE_JSON => Ok(Payload::Json),
            CONTENT_TYPE_XML => Ok(Payload::Xml),
            other => Err(TransportError::UnsupportedContentType(other.to_string())),
        }
    }

    fn encode(self, request: &Value) -> Result<Vec<u8>, TransportError> {
        match self {
            Payload::Json => Ok(serde_json::to_vec(request)?),
            Payload::Xml => Ok(quick_xml::se::to_string_with_root(XML_ROOT, request)?.into_bytes()),
        }
    }

    fn decode(self, body: &str) -> Result<Value, TransportError> {
        match self {
            Payload::Json => Ok(serde_json::from_str(body)?),
            Payload::Xml => Ok(quick_xml::de::from_str(body)?),
        }
    }
}

/// Top-level fields of a JSON object as query pairs. Nulls are skipped.
pub(crate) fn query_pairs(request: &Value) -> Vec<(String, String)> {
    let Value::Object(fields) = request else {
        return Vec::new();
    };
    fields
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        request: &Value,
        content_type: Option<&str>,
    ) -> Result<Value, TransportError> {
        let content_type = content_type.unwrap_or(CONTENT_TYPE_JSON);
        let payload = Payload::for_content_type(content_type)?;

        let url = self.url(path);
        let builder = if method == Method::GET {
            self.client.get(&url).query(&query_pairs(request))
        } else {
            self.client
                .request(method.clone(), &url)
                .header(CONTENT_TYPE, content_type)
                .body(payload.encode(request)?)
        };

        tracing::debug!(%method, %url, content_type, "sending request");
        let response = builder.send().await?;
        let body = response.text().await?;
        payload.decode(&body)
    }
}
