//! Span per operation.

use std::future::Future;

use async_trait::async_trait;
use tracing::field::{display, Empty};
use tracing::{Instrument, Span};

use crate::calculator::{CalcError, Calculator, Operation};
use crate::context::Context;

/// Opens a `calculator.<Op>` span around every call and records its outcome.
#[derive(Debug, Clone)]
pub struct TracingCalculator<S> {
    inner: S,
}

impl<S> TracingCalculator<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

// Span names must be literals.
fn operation_span(op: Operation, a: i64, b: i64) -> Span {
    match op {
        Operation::Add => {
            tracing::info_span!("calculator.Add", a, b, result = Empty, error = Empty)
        }
        Operation::Subtract => {
            tracing::info_span!("calculator.Subtract", a, b, result = Empty, error = Empty)
        }
        Operation::Multiply => {
            tracing::info_span!("calculator.Multiply", a, b, result = Empty, error = Empty)
        }
        Operation::Divide => {
            tracing::info_span!("calculator.Divide", a, b, result = Empty, error = Empty)
        }
    }
}

impl<S: Calculator> TracingCalculator<S> {
    async fn observe<F>(&self, op: Operation, a: i64, b: i64, call: F) -> Result<i64, CalcError>
    where
        F: Future<Output = Result<i64, CalcError>> + Send,
    {
        let span = operation_span(op, a, b);
        let result = call.instrument(span.clone()).await;
        match &result {
            Ok(value) => {
                span.record("result", *value);
            }
            Err(e) => {
                span.record("error", display(e));
            }
        }
        result
    }
}

#[async_trait]
impl<S: Calculator> Calculator for TracingCalculator<S> {
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
