//! Per-call execution context.
//!
//! A [`Context`] carries a cancellation signal and an optional deadline down
//! through every layer of a call. It is never stored past the call that
//! received it. Children derived with [`Context::child`] or
//! [`Context::with_timeout`] are released by their [`CancelGuard`] and are
//! also cancelled whenever their parent is.
//!
//! # Design Decisions
//! - Cancellation is a `tokio_util` token, so polling it is one atomic load
//! - Deadlines are enforced by a timer task that cancels the token
//! - The cause is recorded before the token fires, so `err()` never races

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Why a context finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    cause: OnceLock<ContextError>,
    deadline: Option<Instant>,
    parent: Option<Arc<Inner>>,
}

impl Inner {
    fn cancel(&self, cause: ContextError) {
        // An ancestor's cause stays authoritative once the token has fired.
        if self.token.is_cancelled() {
            return;
        }
        // First cause wins.
        let _ = self.cause.set(cause);
        self.token.cancel();
    }

    fn err(&self) -> Option<ContextError> {
        if !self.token.is_cancelled() {
            return None;
        }
        if let Some(cause) = self.cause.get() {
            return Some(*cause);
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.err())
            .or(Some(ContextError::Canceled))
    }
}

/// Cancellation and deadline carrier for a single call.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// A root context that is never cancelled on its own.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                cause: OnceLock::new(),
                deadline: None,
                parent: None,
            }),
        }
    }

    /// Derive a cancellable child. Dropping the guard cancels the child.
    pub fn child(&self) -> (Context, CancelGuard) {
        self.derive(None)
    }

    /// Derive a child that expires after `timeout`.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime (the deadline timer is a task).
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelGuard) {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child that expires at `deadline`, or at the parent's deadline
    /// if that is earlier.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime (the deadline timer is a task).
    pub fn with_deadline(&self, deadline: Instant) -> (Context, CancelGuard) {
        if matches!(self.deadline(), Some(parent) if parent <= deadline) {
            // The parent's timer already covers this child.
            return self.derive(None);
        }

        let (ctx, guard) = self.derive(Some(deadline));
        if deadline <= Instant::now() {
            ctx.inner.cancel(ContextError::DeadlineExceeded);
            return (ctx, guard);
        }

        let inner = Arc::clone(&ctx.inner);
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep_until(deadline) => {
                    inner.cancel(ContextError::DeadlineExceeded);
                }
                () = inner.token.cancelled() => {}
            }
        });

        (ctx, guard)
    }

    fn derive(&self, deadline: Option<Instant>) -> (Context, CancelGuard) {
        let inner = Arc::new(Inner {
            token: self.inner.token.child_token(),
            cause: OnceLock::new(),
            deadline: deadline.or(self.inner.deadline),
            parent: Some(Arc::clone(&self.inner)),
        });
        let guard = CancelGuard {
            inner: Arc::clone(&inner),
        };
        (Context { inner }, guard)
    }

    /// True once the context was cancelled or its deadline passed.
    pub fn is_done(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// The reason the context finished, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        self.inner.err()
    }

    /// Resolves when the context finishes.
    pub fn done(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }

    /// Effective deadline, inherited from the closest ancestor that has one.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }
}

/// Releases a derived [`Context`]. Cancels it on drop.
#[derive(Debug)]
#[must_use = "dropping the guard cancels the derived context immediately"]
pub struct CancelGuard {
    inner: Arc<Inner>,
}

impl CancelGuard {
    /// Cancel the derived context now.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.inner.cancel(ContextError::Canceled);
    }
}
