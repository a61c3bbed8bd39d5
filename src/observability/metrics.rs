//! Metrics collection and exposition.
//!
//! # Metrics
//! - `calculator_rpc_requests_total` (counter): RPCs by `method` and `code`
//! - `calculator_rpc_duration_seconds` (histogram): RPC latency by `method`
//! - `calculator_injected_faults_total` (counter): failures forced by chaos
//! - `calculator_upstream_retries_total` (counter): replays of the dependency call
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels are static strings; no per-request cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::ObservabilityError;

pub const RPC_REQUESTS_TOTAL: &str = "calculator_rpc_requests_total";
pub const RPC_DURATION_SECONDS: &str = "calculator_rpc_duration_seconds";
pub const INJECTED_FAULTS_TOTAL: &str = "calculator_injected_faults_total";
pub const UPSTREAM_RETRIES_TOTAL: &str = "calculator_upstream_retries_total";

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), ObservabilityError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    describe_counter!(RPC_REQUESTS_TOTAL, "Calculator RPCs by method and result code");
    describe_histogram!(
        RPC_DURATION_SECONDS,
        Unit::Seconds,
        "Calculator RPC latency by method"
    );
    describe_counter!(INJECTED_FAULTS_TOTAL, "Operations failed by fault injection");
    describe_counter!(UPSTREAM_RETRIES_TOTAL, "Retried dependency requests");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished RPC.
pub fn record_rpc(method: &'static str, code: &'static str, started: Instant) {
    counter!(RPC_REQUESTS_TOTAL, "method" => method, "code" => code).increment(1);
    histogram!(RPC_DURATION_SECONDS, "method" => method).record(started.elapsed().as_secs_f64());
}

pub fn record_injected_fault() {
    counter!(INJECTED_FAULTS_TOTAL).increment(1);
}

pub fn record_upstream_retry() {
    counter!(UPSTREAM_RETRIES_TOTAL).increment(1);
}
