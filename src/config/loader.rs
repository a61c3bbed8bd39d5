//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::CalculatorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Deserialize a TOML file without semantic checks, so callers can apply
/// overrides before validating.
pub fn read_config(path: &Path) -> Result<CalculatorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_document(&content)
}

/// Deserialize TOML text. Missing sections and fields take their defaults.
pub fn parse_document(content: &str) -> Result<CalculatorConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Run semantic validation, folding every problem into one error.
pub fn check_config(config: &CalculatorConfig) -> Result<(), ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)
}
