//! Timeout enforcement.
//!
//! # Responsibilities
//! - Run a future only while its execution context is live
//! - Drop (cancel) the future the moment the context finishes
//!
//! # Design Decisions
//! - A context that is already finished never polls the future at all
//! - Timeout errors are the context's own errors, distinct from call errors

use std::future::Future;

use crate::context::{Context, ContextError};

/// Drive `fut` to completion unless `ctx` finishes first.
pub async fn run_until_done<F, T>(ctx: &Context, fut: F) -> Result<T, ContextError>
where
    F: Future<Output = T>,
{
    if let Some(err) = ctx.err() {
        return Err(err);
    }

    tokio::select! {
        biased;
        () = ctx.done() => Err(ctx.err().unwrap_or(ContextError::Canceled)),
        out = fut => Ok(out),
    }
}
