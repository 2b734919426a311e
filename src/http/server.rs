//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing, body limit)
//! - Bind server to listener and drain on shutdown
//! - Dispatch every request to the proxy router

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::{ConfigError, GatewayConfig};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, ForwardedRequest};
use crate::http::response::error_response;
use crate::lifecycle::StopSignal;
use crate::proxy::Router as ProxyRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server, compiling routes from the configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let proxy_router = ProxyRouter::from_config(&config)?;
        Ok(Self::with_router(config, proxy_router))
    }

    /// Create a server around an already-built proxy router.
    pub fn with_router(config: GatewayConfig, proxy_router: ProxyRouter) -> Self {
        let state = AppState {
            router: Arc::new(proxy_router),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer())
                    .layer(RequestBodyLimitLayer::new(config.forwarding.max_body_bytes)),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: StopSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.stopped().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every method and path goes through the proxy router.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let path = request.uri().path().to_string();

    let forwarded = match ForwardedRequest::from_request(request, client_addr) {
        Ok(forwarded) => forwarded,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Malformed request");
            return error_response(&e, Some(&path));
        }
    };

    match state.router.handle(forwarded).await {
        Ok(response) => response,
        Err(e) => error_response(&e, Some(&path)),
    }
}
