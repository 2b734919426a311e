//! Upstream request forwarding.
//!
//! # Responsibilities
//! - Build the outbound request (upstream + path + query)
//! - Apply the header policy for the upstream hop
//! - Enforce the body limit before anything reaches the upstream
//! - Send once, bounded by the upstream deadline
//! - Relay the upstream response with hop-by-hop headers removed
//!
//! # Design Decisions
//! - Bodies with a declared `Content-Length` stream through; the limit layer
//!   has already rejected oversized ones. Bodies without one are collected up
//!   to `max_body_bytes` first, so an oversized upload never reaches a backend
//! - One deadline covers the response head and the relayed body
//! - Pooled hyper client shared by all requests (cheap to clone)
//! - Transport errors become `UpstreamUnreachable` (502), deadline expiry
//!   becomes `UpstreamTimeout` (504)

use std::error::Error as StdError;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_LENGTH;
use axum::http::{Request, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::{ForwardingConfig, TimeoutConfig};
use crate::http::request::ForwardedRequest;
use crate::proxy::ProxyError;
use crate::resilience::Deadline;
use crate::routing::Upstream;
use crate::security::headers;

/// Sends requests to upstreams and relays their responses.
#[derive(Clone, Debug)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstream_timeout: Duration,
    x_forwarded_headers: bool,
    max_body_bytes: usize,
}

impl Forwarder {
    /// Create a forwarder with its own connection pool.
    pub fn new(timeouts: &TimeoutConfig, forwarding: &ForwardingConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeouts.connect()));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            upstream_timeout: timeouts.upstream(),
            x_forwarded_headers: forwarding.x_forwarded_headers,
            max_body_bytes: forwarding.max_body_bytes,
        }
    }

    /// Forward `request` to `upstream` and return its response.
    pub async fn forward(
        &self,
        request: ForwardedRequest,
        upstream: &Upstream,
    ) -> Result<Response<Body>, ProxyError> {
        let ForwardedRequest {
            method,
            path,
            query,
            mut headers,
            body,
            client_addr,
        } = request;

        let uri = upstream
            .join(&path, query.as_deref())
            .map_err(|e| ProxyError::MalformedRequest(format!("cannot build upstream URI: {e}")))?;

        let body = if headers.contains_key(CONTENT_LENGTH) {
            body
        } else {
            self.collect_unsized(body).await?
        };

        // Covers the upstream exchange only, not reading the inbound body.
        let deadline = Deadline::after(self.upstream_timeout);

        let original_host = headers::prepare_upstream_headers(&mut headers);
        if self.x_forwarded_headers {
            headers::append_forwarded(&mut headers, client_addr, original_host.as_ref());
        }

        let mut outbound = Request::new(body);
        *outbound.method_mut() = method;
        *outbound.uri_mut() = uri;
        *outbound.headers_mut() = headers;

        let pending = self.client.request(outbound);
        let response: Response<Incoming> = match deadline.run(pending).await {
            Ok(Ok(response)) => response,
            Ok(Err(source)) if exceeds_body_limit(&source) => {
                return Err(ProxyError::PayloadTooLarge {
                    limit: self.max_body_bytes,
                })
            }
            Ok(Err(source)) => {
                return Err(ProxyError::UpstreamUnreachable {
                    upstream: upstream.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(ProxyError::UpstreamTimeout {
                    upstream: upstream.to_string(),
                    timeout: deadline.limit(),
                })
            }
        };

        let (mut parts, body) = response.into_parts();
        headers::strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(deadline.bound_body(body))))
    }

    /// Read a body of unknown length, failing once it passes the limit.
    async fn collect_unsized(&self, body: Body) -> Result<Body, ProxyError> {
        match Limited::new(body, self.max_body_bytes).collect().await {
            Ok(collected) => Ok(Body::from(collected.to_bytes())),
            Err(e) if exceeds_body_limit(&*e) => Err(ProxyError::PayloadTooLarge {
                limit: self.max_body_bytes,
            }),
            Err(e) => Err(ProxyError::MalformedRequest(format!(
                "request body could not be read: {e}"
            ))),
        }
    }
}

/// Whether `err` or anything it wraps is a body length limit violation.
fn exceeds_body_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue, Method};

    async fn echo_upstream() -> Upstream {
        let app = axum::Router::new().fallback(|request: Request<Body>| async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
            let summary = format!(
                "{} {} {}",
                parts.method,
                parts.uri,
                String::from_utf8_lossy(&body)
            );
            let mut response = Response::new(Body::from(summary));
            if let Some(v) = parts.headers.get("x-custom") {
                response.headers_mut().insert("x-echo-custom", v.clone());
            }
            response
                .headers_mut()
                .insert("keep-alive", HeaderValue::from_static("timeout=5"));
            response
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Upstream::parse(&format!("http://{addr}")).unwrap()
    }

    fn forwarder(upstream_ms: u64) -> Forwarder {
        let timeouts = TimeoutConfig {
            connect_ms: 500,
            upstream_ms,
        };
        Forwarder::new(&timeouts, &ForwardingConfig::default())
    }

    #[tokio::test]
    async fn test_forward_relays_request_and_response() {
        let upstream = echo_upstream().await;
        let request = ForwardedRequest::new(Method::PATCH, "/profiles/1")
            .unwrap()
            .with_query("fields=name")
            .with_header(HeaderName::from_static("x-custom"), HeaderValue::from_static("42"))
            .with_header(HeaderName::from_static("connection"), HeaderValue::from_static("close"))
            .with_body("payload");

        let response = forwarder(1_000).forward(request, &upstream).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(response.headers()["x-echo-custom"], "42");
        assert!(!response.headers().contains_key("keep-alive"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"PATCH /profiles/1?fields=name payload");
    }

    #[tokio::test]
    async fn test_forward_to_closed_port_is_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let upstream = Upstream::parse(&format!("http://{addr}")).unwrap();

        let request = ForwardedRequest::new(Method::GET, "/").unwrap();
        let err = forwarder(1_000).forward(request, &upstream).await.unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamUnreachable { .. }));
        assert_eq!(err.status(), axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_unsized_body_over_limit_never_leaves_gateway() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let upstream = Upstream::parse(&format!("http://{addr}")).unwrap();

        let forwarding = ForwardingConfig {
            max_body_bytes: 16,
            ..ForwardingConfig::default()
        };
        let forwarder = Forwarder::new(&TimeoutConfig::default(), &forwarding);

        // Rejected before the (closed) upstream is ever dialled.
        let request = ForwardedRequest::new(Method::POST, "/signup")
            .unwrap()
            .with_body("x".repeat(64));
        let err = forwarder.forward(request, &upstream).await.unwrap_err();
        assert!(matches!(err, ProxyError::PayloadTooLarge { limit: 16 }));
        assert_eq!(err.status(), axum::http::StatusCode::PAYLOAD_TOO_LARGE);
    }
}
