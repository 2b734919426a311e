//! Request dispatch: route lookup, fallback, forwarding.
//!
//! # Lifecycle
//! ```text
//! RECEIVED → MATCHED | UNMATCHED → FORWARDING → RESPONDED | FAILED
//! ```
//! Each request forwards at most once. Failures are logged with route,
//! upstream and path and never affect other requests.

use std::time::Instant;

use axum::body::Body;
use axum::http::Response;

use crate::config::{validate_config, ConfigError, GatewayConfig, ValidationError};
use crate::http::request::{check_path, ForwardedRequest};
use crate::observability::metrics;
use crate::proxy::{Forwarder, ProxyError};
use crate::routing::{Route, RouteTable, Upstream};

/// Label used for requests served by the default upstream.
pub const DEFAULT_ROUTE: &str = "default";

/// Where a path is sent.
#[derive(Debug, Clone, Copy)]
pub enum Dispatch<'a> {
    /// A configured route matched.
    Route(&'a Route),
    /// No route matched; the default upstream applies.
    Default(&'a Upstream),
}

impl<'a> Dispatch<'a> {
    pub fn route_name(&self) -> &'a str {
        match *self {
            Self::Route(route) => route.name(),
            Self::Default(_) => DEFAULT_ROUTE,
        }
    }

    pub fn upstream(&self) -> &'a Upstream {
        match *self {
            Self::Route(route) => route.upstream(),
            Self::Default(upstream) => upstream,
        }
    }
}

/// Routes requests to upstreams. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
    default_upstream: Option<Upstream>,
    forwarder: Forwarder,
}

impl Router {
    pub fn new(table: RouteTable, default_upstream: Option<Upstream>, forwarder: Forwarder) -> Self {
        Self {
            table,
            default_upstream,
            forwarder,
        }
    }

    /// Compile routes, default upstream and forwarder from configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        // Validation above guarantees both of these parse.
        let table = RouteTable::from_config(&config.routes)
            .map_err(|e| ConfigError::Validation(vec![ValidationError::from(e)]))?;
        let default_upstream = match &config.default_upstream {
            Some(raw) => Some(Upstream::parse(raw).map_err(|e| {
                ConfigError::Validation(vec![ValidationError::DefaultUpstream(e)])
            })?),
            None => None,
        };

        let forwarder = Forwarder::new(&config.timeouts, &config.forwarding);
        Ok(Self::new(table, default_upstream, forwarder))
    }

    /// Decide where `path` goes without forwarding anything.
    pub fn resolve(&self, path: &str) -> Option<Dispatch<'_>> {
        match self.table.match_path(path) {
            Some(route) => Some(Dispatch::Route(route)),
            None => self.default_upstream.as_ref().map(Dispatch::Default),
        }
    }

    /// Route and forward one request.
    pub async fn handle(&self, request: ForwardedRequest) -> Result<Response<Body>, ProxyError> {
        let start = Instant::now();
        let method = request.method.clone();
        let path = request.path.clone();
        let request_id = request.request_id().to_string();

        if let Err(e) = check_path(&path) {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Rejected request");
            metrics::record_request(method.as_str(), e.status().as_u16(), "none", start);
            return Err(e);
        }

        let Some(dispatch) = self.resolve(&path) else {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            let e = ProxyError::NoRouteMatched { path };
            metrics::record_request(method.as_str(), e.status().as_u16(), "none", start);
            return Err(e);
        };

        let route = dispatch.route_name();
        let upstream = dispatch.upstream();

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            route = %route,
            upstream = %upstream,
            "Forwarding request"
        );

        match self.forwarder.forward(request, upstream).await {
            Ok(response) => {
                tracing::debug!(
                    request_id = %request_id,
                    route = %route,
                    status = %response.status(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Upstream responded"
                );
                metrics::record_request(method.as_str(), response.status().as_u16(), route, start);
                Ok(response)
            }
            Err(e) if e.status().is_client_error() => {
                tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    route = %route,
                    error = %e,
                    "Rejected request"
                );
                metrics::record_request(method.as_str(), e.status().as_u16(), route, start);
                Err(e)
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    route = %route,
                    upstream = %upstream,
                    error = %e,
                    "Upstream error"
                );
                metrics::record_request(method.as_str(), e.status().as_u16(), route, start);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    fn router(default_upstream: Option<&str>) -> Router {
        let config = GatewayConfig {
            routes: vec![
                RouteConfig::new("account", ["/signup", "/profiles/**"], "http://127.0.0.1:8081"),
                RouteConfig::new("post", ["/posts/**"], "http://127.0.0.1:8082"),
            ],
            default_upstream: default_upstream.map(str::to_string),
            ..GatewayConfig::default()
        };
        Router::from_config(&config).unwrap()
    }

    #[test]
    fn test_resolve_matched_route() {
        let router = router(None);
        let dispatch = router.resolve("/posts/3").unwrap();
        assert_eq!(dispatch.route_name(), "post");
        assert_eq!(dispatch.upstream().to_string(), "http://127.0.0.1:8082");
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let router = router(Some("http://example.com"));
        let dispatch = router.resolve("/anything/else").unwrap();
        assert_eq!(dispatch.route_name(), DEFAULT_ROUTE);
        assert_eq!(dispatch.upstream().to_string(), "http://example.com");
    }

    #[test]
    fn test_resolve_without_default() {
        assert!(router(None).resolve("/anything/else").is_none());
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = GatewayConfig {
            routes: vec![RouteConfig::new("bad", ["nope"], "http://127.0.0.1:1")],
            ..GatewayConfig::default()
        };
        assert!(matches!(
            Router::from_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_handle_unmatched_is_not_found() {
        let request = ForwardedRequest::new(axum::http::Method::GET, "/nowhere").unwrap();
        let err = router(None).handle(request).await.unwrap_err();
        assert!(matches!(err, ProxyError::NoRouteMatched { ref path } if path == "/nowhere"));
    }
}
