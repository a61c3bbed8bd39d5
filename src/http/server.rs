//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one route per operation
//! - Wire up middleware (request ID, tracing, read/write timeouts)
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};
use tower_http::trace::TraceLayer;

use crate::calculator::{Calculator, Operation};
use crate::config::ServerConfig;
use crate::http::handlers::{self, AppState};
use crate::observability::tracing::make_request_span;

/// Route of an operation, e.g. `/calculator.Calculator/Add`.
pub fn rpc_path(op: Operation) -> String {
    format!("/calculator.Calculator/{}", op.as_str())
}

/// RPC server for the calculator.
pub struct CalculatorServer {
    router: Router,
}

impl CalculatorServer {
    /// Create a new server that dispatches to `calculator`.
    pub fn new(config: &ServerConfig, calculator: Arc<dyn Calculator>) -> Self {
        let state = AppState { calculator };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route(&rpc_path(Operation::Add), post(handlers::add))
            .route(&rpc_path(Operation::Subtract), post(handlers::subtract))
            .route(&rpc_path(Operation::Multiply), post(handlers::multiply))
            .route(&rpc_path(Operation::Divide), post(handlers::divide))
            .with_state(state)
            .layer(TimeoutLayer::new(config.write_timeout()))
            .layer(RequestBodyTimeoutLayer::new(config.read_timeout()))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving on a custom listener or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives, then drain in-flight calls.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "RPC server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("RPC server stopped");
        Ok(())
    }
}
