//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI flag overrides (main.rs)
//!     → CalculatorConfig (validated, immutable)
//!     → consumed once at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; the decorator chain is never reconfigured at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{check_config, parse_document, read_config, ConfigError};
pub use schema::{
    CalculatorConfig, ChaosConfig, DependencyConfig, LogFormat, MiddlewareConfig,
    ObservabilityConfig, RetryConfig, ServerConfig, SimulationConfig,
};
pub use validation::{validate_config, ValidationError};
