//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, operation spans on close)
//!     → metrics.rs (RPC counters and latency, fault and retry counters)
//!     → tracing.rs (request span fields shared by the transport layer)
//!
//! Consumers:
//!     → stdout (JSON or pretty)
//!     → Prometheus scrape endpoint on its own address
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - `RUST_LOG` overrides the configured level
//! - Metrics are cheap (atomic increments); without an installed recorder
//!   every macro is a no-op, which keeps tests free of global setup

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::logging::init_logging;
pub use self::metrics::init_metrics;

/// Failure to install a process-wide observability sink.
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}
