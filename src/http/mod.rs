//! HTTP plumbing around the caller's router.
//!
//! # Data Flow
//! ```text
//! caller's axum::Router
//!     → server.rs (read/write timeouts, listener task, graceful drain)
//!     → handler
//!     → response.rs (JSON encoding with fixed status codes)
//!     → client
//! ```

pub mod response;
pub mod server;

pub use response::{encode_post_response, encode_response, EncodeError};
pub use server::ListenerHandle;
