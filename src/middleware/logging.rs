//! Structured call logging.
//!
//! Emits exactly one event per call once the wrapped operation finishes:
//! INFO `<Op> completed successfully` or WARN `<Op> failed` with the error.
//! The event is produced by a drop guard, so a call whose future is dropped
//! mid-flight still leaves a WARN `<Op> aborted` record.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::calculator::{CalcError, Calculator, Operation};
use crate::context::Context;

/// Logs every call made through it.
#[derive(Debug, Clone)]
pub struct LoggingCalculator<S> {
    inner: S,
}

impl<S> LoggingCalculator<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

enum Outcome {
    Pending,
    Succeeded,
    Failed(String),
}

struct CallLog {
    op: Operation,
    a: i64,
    b: i64,
    started: Instant,
    outcome: Outcome,
}

impl CallLog {
    fn start(op: Operation, a: i64, b: i64) -> Self {
        Self {
            op,
            a,
            b,
            started: Instant::now(),
            outcome: Outcome::Pending,
        }
    }

    fn finish(&mut self, result: &Result<i64, CalcError>) {
        self.outcome = match result {
            Ok(_) => Outcome::Succeeded,
            Err(e) => Outcome::Failed(e.to_string()),
        };
    }
}

impl Drop for CallLog {
    fn drop(&mut self) {
        let duration: Duration = self.started.elapsed();
        let (op, a, b) = (self.op, self.a, self.b);
        match &self.outcome {
            Outcome::Succeeded => {
                tracing::info!(duration = ?duration, a, b, "{op} completed successfully");
            }
            Outcome::Failed(error) => {
                tracing::warn!(duration = ?duration, a, b, error = %error, "{op} failed");
            }
            Outcome::Pending => {
                tracing::warn!(duration = ?duration, a, b, "{op} aborted");
            }
        }
    }
}

impl<S: Calculator> LoggingCalculator<S> {
    async fn observe<F>(&self, op: Operation, a: i64, b: i64, call: F) -> Result<i64, CalcError>
    where
        F: Future<Output = Result<i64, CalcError>> + Send,
    {
        let mut log = CallLog::start(op, a, b);
        let result = call.await;
        log.finish(&result);
        result
    }
}

#[async_trait]
impl<S: Calculator> Calculator for LoggingCalculator<S> {
    async fn add(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        self.observe(Operation::Add, a, b, self.inner.add(ctx, a, b))
            .await
    }

    async fn subtract(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        self.observe(Operation::Subtract, a, b, self.inner.subtract(ctx, a, b))
            .await
    }

    async fn multiply(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        self.observe(Operation::Multiply, a, b, self.inner.multiply(ctx, a, b))
            .await
    }

    async fn divide(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        self.observe(Operation::Divide, a, b, self.inner.divide(ctx, a, b))
            .await
    }
}
