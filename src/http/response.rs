//! Response handling for gateway-generated errors.
//!
//! # Responsibilities
//! - Map `ProxyError` to the status code surfaced to the caller
//! - Render a JSON error body (status, error, message, path)
//!
//! # Design Decisions
//! - Upstream responses are relayed as-is; only gateway errors are rendered here
//! - Raw transport errors never reach the body
//! - Backend timeouts result in 504 Gateway Timeout

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::proxy::ProxyError;

/// Body of every gateway-generated error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.into(),
            path,
        }
    }
}

/// Render `err` for a request to `path`.
pub fn error_response(err: &ProxyError, path: Option<&str>) -> Response {
    let status = err.status();
    let body = ErrorBody::new(status, err.public_message(), path.map(str::to_string));
    (status, Json(body)).into_response()
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let path = match &self {
            ProxyError::NoRouteMatched { path } => Some(path.as_str()),
            _ => None,
        };
        error_response(&self, path)
    }
}
