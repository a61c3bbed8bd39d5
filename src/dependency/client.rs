//! HTTP implementation of the Multiply dependency.
//!
//! # Responsibilities
//! - Build and serialize a randomized recommendation request
//! - POST it with the fixed content type and user header
//! - Accept only a 200 response with a non-empty body
//!
//! # Design Decisions
//! - Each failure stage is its own error variant
//! - Retries happen inside the shared client, not here
//! - The caller's context bounds the whole exchange

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::config::DependencyConfig;
use crate::context::Context;
use crate::dependency::{Dependency, DependencyError, RecommendationRequest};
use crate::resilience::{run_until_done, RetryingClient};

pub const X_USER_ID: &str = "x-user-id";
const CONTENT_TYPE_VALUE: &str = "text/plain;charset=UTF-8";

/// Calls the upstream recommendation endpoint through the shared client.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Arc<RetryingClient>,
    endpoint: String,
    user_id: String,
}

impl UpstreamClient {
    pub fn new(http: Arc<RetryingClient>, config: &DependencyConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            user_id: config.user_id.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn exchange(&self, payload: &RecommendationRequest) -> Result<(), DependencyError> {
        let body = serde_json::to_vec(payload).map_err(DependencyError::Marshal)?;

        // An invalid header value surfaces here, at build time.
        let request = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, CONTENT_TYPE_VALUE)
            .header(X_USER_ID, self.user_id.as_str())
            .body(body)
            .build()
            .map_err(DependencyError::BuildRequest)?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(DependencyError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DependencyError::Status(status));
        }

        let body = response.bytes().await.map_err(DependencyError::ReadBody)?;
        if body.is_empty() {
            return Err(DependencyError::EmptyBody);
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            bytes = body.len(),
            "Upstream call succeeded"
        );
        Ok(())
    }
}

#[async_trait]
impl Dependency for UpstreamClient {
    async fn call(&self, ctx: &Context) -> Result<(), DependencyError> {
        let payload = RecommendationRequest::random();
        run_until_done(ctx, self.exchange(&payload)).await?
    }
}
