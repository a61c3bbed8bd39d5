//! Calculator domain.
//!
//! # Data Flow
//! ```text
//! http::handlers (transport adapter)
//!     → middleware::tracing::TracingCalculator
//!     → middleware::logging::LoggingCalculator
//!     → service::CalculatorService (operation executor)
//!         → chaos::FaultInjector (every operation)
//!         → dependency::Dependency (Multiply only)
//! ```
//!
//! Every layer implements [`Calculator`], so decorators compose in any order.

pub mod service;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::{Context, ContextError};
use crate::dependency::DependencyError;

pub use service::{CalculatorService, SimulationSettings};

/// The four RPC operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Method name as it appears on the wire and in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "Add",
            Operation::Subtract => "Subtract",
            Operation::Multiply => "Multiply",
            Operation::Divide => "Divide",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way an operation can fail. Messages pass through the chain unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("random error")]
    Injected,

    #[error(transparent)]
    Dependency(DependencyError),

    #[error("division by zero")]
    DivisionByZero,

    #[error("worker failed: {0}")]
    Worker(String),
}

impl From<DependencyError> for CalcError {
    fn from(err: DependencyError) -> Self {
        match err {
            // A context failure inside the dependency is still a context failure.
            DependencyError::Context(err) => CalcError::Context(err),
            other => CalcError::Dependency(other),
        }
    }
}

impl From<tokio::task::JoinError> for CalcError {
    fn from(err: tokio::task::JoinError) -> Self {
        CalcError::Worker(err.to_string())
    }
}

/// The operation set shared by the executor and every decorator.
#[async_trait]
pub trait Calculator: Send + Sync {
    async fn add(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError>;

    async fn subtract(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError>;

    async fn multiply(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError>;

    async fn divide(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError>;

    /// Dispatch by operation.
    async fn call(&self, op: Operation, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        match op {
            Operation::Add => self.add(ctx, a, b).await,
            Operation::Subtract => self.subtract(ctx, a, b).await,
            Operation::Multiply => self.multiply(ctx, a, b).await,
            Operation::Divide => self.divide(ctx, a, b).await,
        }
    }
}

#[async_trait]
impl<T: Calculator + ?Sized> Calculator for Arc<T> {
    async fn add(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        (**self).add(ctx, a, b).await
    }

    async fn subtract(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        (**self).subtract(ctx, a, b).await
    }

    async fn multiply(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        (**self).multiply(ctx, a, b).await
    }

    async fn divide(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        (**self).divide(ctx, a, b).await
    }
}
