//! Standard JSON response envelope.
//!
//! ```json
//! { "code": 0, "message": "success", "data": true }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer};

pub const SUCCESS_MESSAGE: &str = "success";
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Application-level result code, serialized as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomCode {
    Success = 0,
    InternalError = 100,
    ValidationError = 101,
}

impl CustomCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl Serialize for CustomCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: CustomCode,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Any message (explicit, or the default one a non-success code implies)
    /// replaces `"success"` and drops `data`. Empty messages count as absent.
    pub fn new(data: Option<T>, code: CustomCode, message: Option<&str>) -> Self {
        let message = match message.filter(|m| !m.is_empty()) {
            Some(m) => Some(m),
            None if code != CustomCode::Success => Some(DEFAULT_ERROR_MESSAGE),
            None => None,
        };

        match message {
            Some(m) => Self {
                code,
                message: m.to_string(),
                data: None,
            },
            None => Self {
                code,
                message: SUCCESS_MESSAGE.to_string(),
                data,
            },
        }
    }
}

pub fn new_response<T: Serialize>(
    status: StatusCode,
    data: Option<T>,
    code: CustomCode,
    message: Option<&str>,
) -> Response {
    (status, Json(Envelope::new(data, code, message))).into_response()
}

/// `200 OK` with `data`.
pub fn success<T: Serialize>(data: T) -> Response {
    new_response(StatusCode::OK, Some(data), CustomCode::Success, None)
}

pub fn failure(status: StatusCode, code: CustomCode, message: &str) -> Response {
    new_response::<()>(status, None, code, Some(message))
}
