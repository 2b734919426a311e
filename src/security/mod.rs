//! Header hygiene for proxied traffic.
//!
//! # Data Flow
//! ```text
//! Inbound request headers
//!     → headers.rs (drop hop-by-hop + Host, add X-Forwarded-*)
//!     → upstream request
//!
//! Upstream response headers
//!     → headers.rs (drop hop-by-hop)
//!     → client response
//! ```

pub mod headers;
