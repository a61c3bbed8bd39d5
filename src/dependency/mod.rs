//! Outbound dependency subsystem.
//!
//! # Data Flow
//! ```text
//! Multiply (under a child context with a fixed timeout)
//!     → payload.rs (randomized recommendation request)
//!     → client.rs (serialize, POST via the shared RetryingClient)
//!     → 200 + non-empty body, or a distinct DependencyError
//! ```

pub mod client;
pub mod payload;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::context::{Context, ContextError};

pub use client::UpstreamClient;
pub use payload::RecommendationRequest;

/// Why the dependency call failed. Every variant is fatal to the calling operation.
#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    #[error("failed to marshal payload: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("failed to create request: {0}")]
    BuildRequest(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request failed with status code {}", .0.as_u16())]
    Status(StatusCode),

    #[error("failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("response body is empty")]
    EmptyBody,

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// A time-bounded outbound call.
#[async_trait]
pub trait Dependency: Send + Sync {
    async fn call(&self, ctx: &Context) -> Result<(), DependencyError>;
}
