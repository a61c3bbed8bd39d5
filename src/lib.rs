//! Chaos calculator library.
//!
//! An RPC calculator service whose four operations deliberately misbehave:
//! Add fills a large buffer, Subtract blocks, Multiply calls a remote
//! dependency, and every operation fails at random. It exists to exercise
//! observability and load-testing tooling against realistic failure modes.

pub mod calculator;
pub mod chaos;
pub mod config;
pub mod context;
pub mod dependency;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod resilience;

pub use calculator::{CalcError, Calculator, CalculatorService, Operation};
pub use config::CalculatorConfig;
pub use context::{CancelGuard, Context, ContextError};
pub use http::CalculatorServer;
pub use lifecycle::Shutdown;
