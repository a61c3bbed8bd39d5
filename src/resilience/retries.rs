//! Retry logic.
//!
//! # Responsibilities
//! - Determine if an outbound attempt failed transiently
//! - Replay the request with exponential backoff + jitter
//! - Bound the number of retries per request
//!
//! # Design Decisions
//! - Bodies are buffered, so replaying a POST sends identical bytes
//! - Connection errors and timeouts always retry; 429 and 5xx (except 501) too
//! - After the last retry the final response is handed back unchanged
//! - One client (one connection pool) is shared by every in-flight request

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Request, RequestBuilder, Response, StatusCode};

use crate::config::RetryConfig;

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Whether an attempt outcome is worth replaying.
pub fn is_retryable(status: Option<StatusCode>, error: Option<&reqwest::Error>) -> bool {
    if let Some(err) = error {
        return err.is_connect() || err.is_timeout() || err.is_request();
    }
    match status {
        Some(StatusCode::TOO_MANY_REQUESTS) => true,
        Some(StatusCode::NOT_IMPLEMENTED) => false,
        Some(status) => status.is_server_error(),
        None => false,
    }
}

/// Bounds and pacing of retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Single attempt, no replay.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        calculate_backoff(retry, self.base_delay_ms, self.max_delay_ms)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

/// Shared HTTP client that replays transient failures.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RetryingClient {
    inner: Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    /// Build a client with a fresh connection pool.
    pub fn new(policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        let inner = Client::builder()
            .user_agent(concat!("chaos-calculator/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(inner, policy))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(inner: Client, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Start a POST request; send it with [`RetryingClient::execute`].
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.inner.post(url)
    }

    /// Send `request`, replaying it on transient failures.
    pub async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
        let mut current = request;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let replay = if attempt <= self.policy.max_retries {
                current.try_clone()
            } else {
                None
            };
            let url = current.url().clone();

            let outcome = self.inner.execute(current).await;

            let Some(next) = replay else {
                return outcome;
            };
            let retryable = match &outcome {
                Ok(response) => is_retryable(Some(response.status()), None),
                Err(err) => is_retryable(None, Some(err)),
            };
            if !retryable {
                return outcome;
            }

            let delay = self.policy.backoff(attempt);
            match &outcome {
                Ok(response) => tracing::warn!(
                    url = %url,
                    attempt,
                    status = %response.status(),
                    delay = ?delay,
                    "Retrying upstream request"
                ),
                Err(err) => tracing::warn!(
                    url = %url,
                    attempt,
                    error = %err,
                    delay = ?delay,
                    "Retrying upstream request after transport error"
                ),
            }
            crate::observability::metrics::record_upstream_retry();

            drop(outcome);
            tokio::time::sleep(delay).await;
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000);
        assert!(max.as_millis() < 1100);

        assert_eq!(calculate_backoff(0, 100, 1000), Duration::ZERO);
    }

    #[test]
    fn transient_statuses_retry() {
        assert!(is_retryable(Some(StatusCode::TOO_MANY_REQUESTS), None));
        assert!(is_retryable(Some(StatusCode::INTERNAL_SERVER_ERROR), None));
        assert!(is_retryable(Some(StatusCode::SERVICE_UNAVAILABLE), None));
    }

    #[test]
    fn final_statuses_do_not_retry() {
        assert!(!is_retryable(Some(StatusCode::OK), None));
        assert!(!is_retryable(Some(StatusCode::BAD_REQUEST), None));
        assert!(!is_retryable(Some(StatusCode::NOT_IMPLEMENTED), None));
        assert!(!is_retryable(None, None));
    }

    #[test]
    fn policy_follows_config() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_retries: 4,
            base_delay_ms: 10,
            max_delay_ms: 20,
        });
        assert_eq!(policy.max_retries, 4);
        assert!(policy.backoff(5) <= Duration::from_millis(22));
        assert_eq!(RetryPolicy::default().max_retries, 10);
    }
}
