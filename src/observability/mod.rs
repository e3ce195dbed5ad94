//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Library and handlers
//!     → tracing events (structured fields)
//!     → logging.rs (registry + EnvFilter + fmt layer)
//!     → stdout
//!
//! Third-party code that only knows io::Write
//!     → log_writer.rs (debug-level pass-through)
//!     → tracing events
//! ```

pub mod log_writer;
pub mod logging;

pub use log_writer::LogWriter;
pub use logging::init_logging;
