//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call from an operation:
//!     → timeouts.rs (race the call against the caller's context)
//!     → retries.rs (shared client; replay transient failures with backoff)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call runs under a deadline
//! - Retry lives only in the shared HTTP client, never in operation logic
//! - Only transient classes retry: connect/timeout errors, 429 and 5xx

pub mod retries;
pub mod timeouts;

pub use retries::{calculate_backoff, is_retryable, RetryPolicy, RetryingClient};
pub use timeouts::run_until_done;
