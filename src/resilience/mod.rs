//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (one deadline for response head and body)
//!     → Expiry before headers: request future dropped, caller gets 504
//!     → Expiry mid-body: relayed body ends with an error
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Single attempt per request: no retries, no circuit breaking

pub mod timeouts;

pub use timeouts::{with_deadline, Deadline, DeadlineBody, DeadlineExceeded};
