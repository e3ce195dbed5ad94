//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize into ServerSettings)
//!     → validation.rs (semantic checks)
//!     → ServerSettings::into_options()
//!
//! code options (with_port, with_read_timeout, ...)
//!     → appended after file options
//!
//! ServerConfig::from_options(options)
//!     → defaults, then each option in call order (last write wins)
//!     → ServerConfig (immutable for the lifetime of one start() call)
//! ```

pub mod loader;
pub mod options;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, parse_settings, ConfigError};
pub use options::{
    with_host, with_port, with_read_timeout, with_shutdown_callbacks, with_shutdown_timeout,
    with_write_timeout, ServerOption,
};
pub use schema::{ServerConfig, ServerSettings};
pub use validation::ValidationError;
