//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Apply options → Subscribe to shutdown source → Spawn listener
//!
//! Wait:
//!     listener result ──┐
//!                       ├─ select (first ready wins)
//!     token cancelled ──┘
//!
//! Shutdown:
//!     Release subscription → Drain listener (bounded) → Callbacks in order
//!     → Joined error or Ok
//!
//! Signals (signals.rs):
//!     SIGINT → cancel the run token
//! Manual (shutdown.rs):
//!     Shutdown::trigger() → same effect, for embedding and tests
//! ```

pub mod callbacks;
pub mod error;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use callbacks::ShutdownCallback;
pub use error::{BoxError, JoinedError, ServerError};
pub use shutdown::Shutdown;
pub use startup::{start, start_with_signal};
