//! Chaos subsystem.
//!
//! # Data Flow
//! ```text
//! Every calculator operation:
//!     → injector.rs (one secure random draw per call)
//!     → true: operation returns the generic "random error"
//!     → false: operation computes its result
//! ```
//!
//! # Design Decisions
//! - Draws come from the OS CSPRNG, so failures are not predictable
//! - The injector only decides *whether* to fail, never *what* to compute
//! - Forced modes exist so tests and operators can pin the outcome

pub mod injector;

pub use injector::{random_below, FaultInjector, FaultMode};
