//! HTTP service bootstrap library.
//!
//! Starts an [`axum::Router`] on a TCP listener, waits for either the listener
//! to fail or an operator-requested shutdown, drains in-flight requests and
//! runs the registered cleanup callbacks, collecting every error on the way.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{ServerConfig, ServerOption};
pub use lifecycle::{start, start_with_signal, JoinedError, ServerError, Shutdown, ShutdownCallback};
