//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and SIGTERM both request a graceful shutdown. A handler
//! that cannot be installed is logged and simply never fires.

use std::future::pending;

use crate::lifecycle::Shutdown;

/// Resolves on the first termination signal.
pub async fn termination() {
    tokio::select! {
        () = interrupt() => tracing::info!(signal = "SIGINT", "Termination signal received"),
        () = terminate() => tracing::info!(signal = "SIGTERM", "Termination signal received"),
    }
}

/// Wait for a termination signal, then trigger `shutdown`.
pub async fn forward_to(shutdown: Shutdown) {
    termination().await;
    shutdown.trigger();
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGTERM handler");
            pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    pending::<()>().await;
}
