//! Instrumentation decorators.
//!
//! # Data Flow
//! ```text
//! transport adapter
//!     → tracing.rs (span `calculator.<Op>`, records the outcome)
//!     → logging.rs (one structured event per call)
//!     → operation executor
//! ```
//!
//! # Design Decisions
//! - Decorators are generic over any [`Calculator`], so the chain is
//!   assembled from configuration at startup and never changes afterwards
//! - Neither decorator alters the value or the error it observes
//! - Each decorator invokes the wrapped operation exactly once

pub mod logging;
pub mod tracing;

use std::sync::Arc;

use crate::calculator::Calculator;
use crate::config::MiddlewareConfig;

pub use self::logging::LoggingCalculator;
pub use self::tracing::TracingCalculator;

/// Wrap `service` in the enabled decorators. Tracing is outermost, so log
/// events land inside the operation span.
pub fn build_chain<S>(service: S, config: &MiddlewareConfig) -> Arc<dyn Calculator>
where
    S: Calculator + 'static,
{
    let mut chain: Arc<dyn Calculator> = Arc::new(service);
    if config.logging {
        chain = Arc::new(LoggingCalculator::new(chain));
    }
    if config.tracing {
        chain = Arc::new(TracingCalculator::new(chain));
    }
    chain
}
