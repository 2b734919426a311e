//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, path check, ForwardedRequest)
//!     → proxy::Router (match + forward)
//!     → response.rs (gateway errors as JSON)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ForwardedRequest, X_REQUEST_ID};
pub use response::{error_response, ErrorBody};
pub use server::HttpServer;
