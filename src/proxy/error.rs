//! Gateway error taxonomy.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Why a request could not be answered by an upstream.
///
/// Transport errors are always translated into one of these; the raw
/// error is kept only as a source for logging.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Inbound request cannot be routed (e.g. empty path).
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Request body is larger than `forwarding.max_body_bytes`.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// No route and no default upstream cover the path.
    #[error("no route matched path `{path}`")]
    NoRouteMatched { path: String },

    /// Connection refused/reset, DNS failure or connect timeout.
    #[error("upstream {upstream} unreachable: {source}")]
    UpstreamUnreachable {
        upstream: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// Upstream did not respond within the configured deadline.
    #[error("upstream {upstream} did not respond within {timeout:?}")]
    UpstreamTimeout { upstream: String, timeout: Duration },
}

impl ProxyError {
    /// Status code surfaced to the original caller.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NoRouteMatched { .. } => StatusCode::NOT_FOUND,
            Self::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Message safe to show the caller; omits transport internals.
    pub fn public_message(&self) -> String {
        match self {
            Self::MalformedRequest(reason) => reason.clone(),
            Self::PayloadTooLarge { limit } => format!("Request body exceeds {limit} bytes"),
            Self::NoRouteMatched { .. } => "No matching route found".to_string(),
            Self::UpstreamUnreachable { .. } => "Upstream request failed".to_string(),
            Self::UpstreamTimeout { .. } => "Upstream response timed out".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ProxyError::MalformedRequest("empty path".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::PayloadTooLarge { limit: 16 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ProxyError::NoRouteMatched { path: "/x".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ProxyError::UpstreamTimeout {
                upstream: "http://a".into(),
                timeout: Duration::from_millis(100),
            }
            .status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
