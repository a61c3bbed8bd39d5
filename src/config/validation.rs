//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, buffer size > 0)
//! - Check that addresses and the dependency endpoint parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CalculatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::CalculatorConfig;

/// Largest buffer Add may allocate (16 GiB).
pub const MAX_MEMORY_BYTES: u64 = 16 * 1024 * 1024 * 1024;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &CalculatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.read_timeout_secs == 0 {
        errors.push(ValidationError::new("server.read_timeout_secs", "must be > 0"));
    }
    if config.server.write_timeout_secs == 0 {
        errors.push(ValidationError::new("server.write_timeout_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if config.simulation.memory_bytes == 0 {
        errors.push(ValidationError::new("simulation.memory_bytes", "must be > 0"));
    } else if config.simulation.memory_bytes as u64 > MAX_MEMORY_BYTES {
        errors.push(ValidationError::new(
            "simulation.memory_bytes",
            format!("must not exceed {MAX_MEMORY_BYTES}"),
        ));
    }
    if config.simulation.dependency_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "simulation.dependency_timeout_ms",
            "must be > 0",
        ));
    }

    if config.chaos.enabled && config.chaos.draw_range == 0 {
        errors.push(ValidationError::new("chaos.draw_range", "must be > 0"));
    }

    match url::Url::parse(&config.dependency.endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "dependency.endpoint",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("dependency.endpoint", e.to_string())),
    }

    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
