//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerSettings;
use crate::config::validation::{validate_settings, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate server settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<ServerSettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parse and validate server settings from TOML text.
pub fn parse_settings(content: &str) -> Result<ServerSettings, ConfigError> {
    let settings: ServerSettings = toml::from_str(content)?;
    validate_settings(&settings).map_err(ConfigError::Validation)?;
    Ok(settings)
}
