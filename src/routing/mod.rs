//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup in declaration order)
//!     → matcher.rs (evaluate path templates)
//!     → Return: matched Route or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Parse templates (matcher.rs) and upstreams (upstream.rs)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;
pub mod upstream;

pub use matcher::{PathTemplate, PatternError, RoutePattern};
pub use router::{Route, RouteError, RouteTable};
pub use upstream::{Upstream, UpstreamError};
