//! Chaos calculator service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client RPC            ┌────────────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http server ──▶ tracing ──▶ logging ──▶ executor │
//!                           │   (axum, ids,     decorator   decorator     │      │
//!                           │    timeouts)                                │      │
//!                           │                       ┌─────────────────────┤      │
//!                           │                       ▼                     ▼      │
//!                           │                 fault injector     dependency ─────┼──▶ upstream
//!                           │                                    (retrying       │
//!                           │                                     HTTP client)   │
//!                           │                                                    │
//!                           │  config · observability · lifecycle                │
//!                           └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use chaos_calculator::config::{check_config, read_config, CalculatorConfig, ConfigError};
use chaos_calculator::lifecycle;
use chaos_calculator::observability::init_logging;

#[derive(Parser, Debug)]
#[command(name = "chaos-calculator", version)]
#[command(about = "Calculator RPC service with simulated resource pressure and random faults", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// RPC listen address
    #[arg(long)]
    addr: Option<String>,

    /// Prometheus endpoint address
    #[arg(long)]
    metrics_address: Option<String>,

    /// Request read timeout in seconds
    #[arg(long, value_name = "SECS")]
    read_timeout: Option<u64>,

    /// Response write timeout in seconds
    #[arg(long, value_name = "SECS")]
    write_timeout: Option<u64>,
}

impl Args {
    fn apply(&self, config: &mut CalculatorConfig) {
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(addr) = &self.addr {
            config.server.bind_address = addr.clone();
        }
        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_address = addr.clone();
        }
        if let Some(secs) = self.read_timeout {
            config.server.read_timeout_secs = secs;
        }
        if let Some(secs) = self.write_timeout {
            config.server.write_timeout_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => CalculatorConfig::default(),
    };
    args.apply(&mut config);

    init_logging(&config.observability.log_level, config.observability.log_format)?;

    if let Err(err) = check_config(&config) {
        if let ConfigError::Validation(errors) = &err {
            for error in errors {
                tracing::error!(field = error.field, message = %error.message, "Invalid configuration");
            }
        }
        return Err(err.into());
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.server.bind_address,
        metrics_address = %config.observability.metrics_address,
        read_timeout_secs = config.server.read_timeout_secs,
        write_timeout_secs = config.server.write_timeout_secs,
        "chaos-calculator starting"
    );

    lifecycle::run(config).await?;
    Ok(())
}
