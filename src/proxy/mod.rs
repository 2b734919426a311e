//! Proxy core.
//!
//! # Data Flow
//! ```text
//! ForwardedRequest
//!     → router.rs (match route, else default upstream, else 404)
//!     → forwarder.rs (rewrite URI + headers, send once with deadline)
//!     → upstream Response, or ProxyError (error.rs) mapped to 400/404/502/504
//! ```
//!
//! # Design Decisions
//! - No business logic: bodies and end-to-end headers pass through untouched
//! - No shared mutable state between requests
//! - No retries; each request is attempted exactly once

pub mod error;
pub mod forwarder;
pub mod router;

pub use error::ProxyError;
pub use forwarder::Forwarder;
pub use router::{Dispatch, Router, DEFAULT_ROUTE};
