//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the calculator service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CalculatorConfig {
    /// RPC listener settings.
    pub server: ServerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Resource simulation inside the operations.
    pub simulation: SimulationConfig,

    /// Random fault injection.
    pub chaos: ChaosConfig,

    /// Outbound dependency called by Multiply.
    pub dependency: DependencyConfig,

    /// Retry policy of the shared HTTP client.
    pub retries: RetryConfig,

    /// Which decorators wrap the operation executor.
    pub middleware: MiddlewareConfig,
}

/// RPC listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:11211").
    pub bind_address: String,

    /// Maximum time to receive a request body, in seconds.
    pub read_timeout_secs: u64,

    /// Maximum time to produce a response, in seconds.
    pub write_timeout_secs: u64,
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:11211".to_string(),
            read_timeout_secs: 10,
            write_timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9464".to_string(),
        }
    }
}

/// Resource simulation knobs. Defaults are the demo's fixed constants.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Bytes allocated and filled by every Add.
    pub memory_bytes: usize,

    /// Uninterruptible wait inside every Subtract, in milliseconds.
    pub blocking_wait_ms: u64,

    /// Deadline for Multiply's dependency call, in milliseconds.
    pub dependency_timeout_ms: u64,
}

impl SimulationConfig {
    pub fn blocking_wait(&self) -> Duration {
        Duration::from_millis(self.blocking_wait_ms)
    }

    pub fn dependency_timeout(&self) -> Duration {
        Duration::from_millis(self.dependency_timeout_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            memory_bytes: 500 * 1024 * 1024, // 500 MiB
            blocking_wait_ms: 5_000,
            dependency_timeout_ms: 5_000,
        }
    }
}

/// Fault injection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChaosConfig {
    /// Enable random faults.
    pub enabled: bool,

    /// Draws are uniform in `0..draw_range`.
    pub draw_range: u64,

    /// A draw strictly greater than this fails the call.
    pub threshold: u64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            draw_range: 10,
            threshold: 7,
        }
    }
}

/// Outbound dependency configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Endpoint receiving the POST.
    pub endpoint: String,

    /// Value of the `X-User-Id` header.
    pub user_id: String,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://quickpizza.grafana.com/api/pizza".to_string(),
            user_id: "298337".to_string(),
        }
    }
}

/// Retry configuration for the shared HTTP client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 disables retrying).
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

/// Decorator chain composition. Tracing wraps logging when both are on.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    pub tracing: bool,
    pub logging: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            tracing: true,
            logging: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: CalculatorConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:11211");
        assert_eq!(config.simulation.memory_bytes, 500 * 1024 * 1024);
        assert_eq!(config.retries.max_retries, 10);
        assert_eq!(config.chaos.threshold, 7);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: CalculatorConfig = toml::from_str(
            r#"
            [simulation]
            memory_bytes = 1024

            [observability]
            log_format = "pretty"
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.memory_bytes, 1024);
        assert_eq!(config.simulation.blocking_wait(), Duration::from_secs(5));
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert_eq!(config.observability.metrics_address, "0.0.0.0:9464");
    }
}
