//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerSettings → Result<(), Vec<ValidationError>>
//! - Runs before file settings are turned into options

use thiserror::Error;

use crate::config::schema::ServerSettings;

/// A single problem found in the settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("port {0:?} is not a number in 0..=65535")]
    InvalidPort(String),

    #[error("host must not be empty")]
    EmptyHost,

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

/// Check `settings` and collect every problem.
pub fn validate_settings(settings: &ServerSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(port) = &settings.port {
        if port.parse::<u16>().is_err() {
            errors.push(ValidationError::InvalidPort(port.clone()));
        }
    }

    if let Some(host) = &settings.host {
        if host.trim().is_empty() {
            errors.push(ValidationError::EmptyHost);
        }
    }

    let timeouts = [
        ("read_timeout_secs", settings.read_timeout_secs),
        ("write_timeout_secs", settings.write_timeout_secs),
        ("shutdown_timeout_secs", settings.shutdown_timeout_secs),
    ];
    for (field, value) in timeouts {
        if value == Some(0) {
            errors.push(ValidationError::ZeroTimeout { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
