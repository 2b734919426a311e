//! Path-prefix HTTP gateway library.
//!
//! Forwards each request to the upstream of the first route whose path
//! templates match, falling back to an optional default upstream.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::Router;
