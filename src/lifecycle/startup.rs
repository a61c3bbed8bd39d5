//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Assemble the decorator chain around the operation executor
//! - Bind the listener last and serve until a termination signal
//!
//! Logging is installed by the binary before this runs, so configuration
//! problems are already reported through it.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::calculator::{Calculator, CalculatorService, SimulationSettings};
use crate::chaos::FaultInjector;
use crate::config::CalculatorConfig;
use crate::dependency::UpstreamClient;
use crate::http::CalculatorServer;
use crate::lifecycle::{signals, Shutdown};
use crate::middleware::build_chain;
use crate::observability::{init_metrics, ObservabilityError};
use crate::resilience::{RetryPolicy, RetryingClient};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid address '{0}'")]
    Address(String),

    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the fully decorated calculator described by `config`.
pub fn build_calculator(config: &CalculatorConfig) -> Result<Arc<dyn Calculator>, StartupError> {
    let http = RetryingClient::new(RetryPolicy::from(&config.retries))
        .map_err(StartupError::HttpClient)?;
    let dependency = Arc::new(UpstreamClient::new(Arc::new(http), &config.dependency));
    let faults = FaultInjector::from_config(&config.chaos);

    tracing::info!(
        endpoint = %dependency.endpoint(),
        max_retries = config.retries.max_retries,
        fault_mode = ?faults.mode(),
        memory_bytes = config.simulation.memory_bytes,
        "Calculator initialized"
    );

    let service = CalculatorService::new(
        dependency,
        faults,
        SimulationSettings::from(&config.simulation),
    );
    Ok(build_chain(service, &config.middleware))
}

/// Run the service until SIGINT or SIGTERM.
pub async fn run(config: CalculatorConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address(config.observability.metrics_address.clone()))?;
        init_metrics(addr)?;
    }

    let calculator = build_calculator(&config)?;

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.server.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_to(shutdown.clone()));

    let server = CalculatorServer::new(&config.server, calculator);
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
