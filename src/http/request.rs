//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) and echo it on the response
//! - Validate the request path before routing
//! - Capture what the forwarder needs (method, path, query, headers, body)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body is carried as a stream; it is never buffered here

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::header::HOST;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::proxy::ProxyError;

/// Header carrying the correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that assigns an `x-request-id` to requests lacking one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// An inbound request on its way to an upstream.
#[derive(Debug)]
pub struct ForwardedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Body,
    pub client_addr: Option<SocketAddr>,
}

impl ForwardedRequest {
    /// Create a request with no headers and an empty body.
    pub fn new(method: Method, path: impl Into<String>) -> Result<Self, ProxyError> {
        let path = path.into();
        check_path(&path)?;
        Ok(Self {
            method,
            path,
            query: None,
            headers: HeaderMap::new(),
            body: Body::empty(),
            client_addr: None,
        })
    }

    /// Take apart an inbound HTTP request.
    pub fn from_request(
        request: Request<Body>,
        client_addr: Option<SocketAddr>,
    ) -> Result<Self, ProxyError> {
        let (mut parts, body) = request.into_parts();
        let path = parts.uri.path().to_string();
        check_path(&path)?;

        // HTTP/2 carries the host in `:authority` rather than a Host header.
        if !parts.headers.contains_key(HOST) {
            if let Some(authority) = parts.uri.authority() {
                if let Ok(value) = HeaderValue::from_str(authority.as_str()) {
                    parts.headers.insert(HOST, value);
                }
            }
        }

        Ok(Self {
            method: parts.method,
            path,
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
            client_addr,
        })
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// The correlation ID, or `-` when the request carries none.
    pub fn request_id(&self) -> &str {
        self.headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
    }
}

/// Paths must be non-empty and absolute; anything else is rejected before matching.
pub fn check_path(path: &str) -> Result<(), ProxyError> {
    if path.is_empty() {
        return Err(ProxyError::MalformedRequest("empty request path".to_string()));
    }
    if !path.starts_with('/') {
        return Err(ProxyError::MalformedRequest(format!(
            "request path `{path}` must start with `/`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_request_splits_uri() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("http://gateway.local/posts/1?expand=comments")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let fwd = ForwardedRequest::from_request(req, None).unwrap();
        assert_eq!(fwd.method, Method::POST);
        assert_eq!(fwd.path, "/posts/1");
        assert_eq!(fwd.query.as_deref(), Some("expand=comments"));
        assert_eq!(fwd.headers["content-type"], "application/json");
        assert_eq!(fwd.request_id(), "-");
    }

    #[test]
    fn test_authority_stands_in_for_missing_host() {
        let req = Request::builder()
            .version(axum::http::Version::HTTP_2)
            .uri("http://gateway.local:8080/posts")
            .body(Body::empty())
            .unwrap();
        let fwd = ForwardedRequest::from_request(req, None).unwrap();
        assert_eq!(fwd.headers[HOST], "gateway.local:8080");

        let req = Request::builder()
            .uri("http://ignored.local/posts")
            .header("host", "edge.example")
            .body(Body::empty())
            .unwrap();
        let fwd = ForwardedRequest::from_request(req, None).unwrap();
        assert_eq!(fwd.headers[HOST], "edge.example");
    }

    #[test]
    fn test_rejects_empty_and_relative_paths() {
        assert!(matches!(
            ForwardedRequest::new(Method::GET, ""),
            Err(ProxyError::MalformedRequest(_))
        ));
        assert!(matches!(
            ForwardedRequest::new(Method::OPTIONS, "*"),
            Err(ProxyError::MalformedRequest(_))
        ));
        assert!(ForwardedRequest::new(Method::GET, "/").is_ok());
    }
}
