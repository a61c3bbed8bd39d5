//! Operation executor.
//!
//! Implements the four operations together with the failure modes they
//! simulate:
//!
//! | Operation | Simulation                                   | Honors cancellation      |
//! |-----------|----------------------------------------------|--------------------------|
//! | Add       | fills a large transient buffer byte by byte  | on every byte            |
//! | Subtract  | one fixed wait                               | only before the wait     |
//! | Multiply  | one upstream call under a child timeout      | throughout the call      |
//! | Divide    | none                                         | never                    |
//!
//! Every operation consults the fault injector exactly once, after its
//! simulation and before computing the result.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::calculator::{CalcError, Calculator};
use crate::chaos::FaultInjector;
use crate::config::SimulationConfig;
use crate::context::{Context, ContextError};
use crate::dependency::Dependency;
use crate::resilience::run_until_done;

/// Resource simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSettings {
    pub memory_bytes: usize,
    pub blocking_wait: Duration,
    pub dependency_timeout: Duration,
}

impl From<&SimulationConfig> for SimulationSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            memory_bytes: config.memory_bytes,
            blocking_wait: config.blocking_wait(),
            dependency_timeout: config.dependency_timeout(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

/// Writes `buf[i] = i as u8` for every byte, polling `interrupted` before each write.
///
/// Returns how many bytes were written.
pub fn fill_buffer(buf: &mut [u8], mut interrupted: impl FnMut() -> bool) -> usize {
    for (i, byte) in buf.iter_mut().enumerate() {
        if interrupted() {
            return i;
        }
        *byte = i as u8;
    }
    buf.len()
}

/// Stateless executor shared by every request.
pub struct CalculatorService {
    dependency: Arc<dyn Dependency>,
    faults: FaultInjector,
    settings: SimulationSettings,
}

impl fmt::Debug for CalculatorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatorService")
            .field("faults", &self.faults)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CalculatorService {
    pub fn new(
        dependency: Arc<dyn Dependency>,
        faults: FaultInjector,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            dependency,
            faults,
            settings,
        }
    }

    fn inject_fault(&self) -> Result<(), CalcError> {
        if self.faults.should_fail() {
            return Err(CalcError::Injected);
        }
        Ok(())
    }
}

#[async_trait]
impl Calculator for CalculatorService {
    async fn add(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let size = self.settings.memory_bytes;
        // Scoped to this call: dropping the call stops the fill.
        let (worker_ctx, _release) = ctx.child();
        let written = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; size];
            let written = fill_buffer(&mut buf, || worker_ctx.is_done());
            std::hint::black_box(&buf);
            written
        })
        .await?;

        if written < size {
            tracing::debug!(written, size, "Memory fill interrupted");
            return Err(ctx.err().unwrap_or(ContextError::Canceled).into());
        }

        self.inject_fault()?;
        Ok(a.wrapping_add(b))
    }

    async fn subtract(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        // Deliberately not raced against the context.
        tokio::time::sleep(self.settings.blocking_wait).await;

        self.inject_fault()?;
        Ok(a.wrapping_sub(b))
    }

    async fn multiply(&self, ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        let (call_ctx, _release) = ctx.with_timeout(self.settings.dependency_timeout);
        if let Some(err) = call_ctx.err() {
            return Err(err.into());
        }

        run_until_done(&call_ctx, self.dependency.call(&call_ctx)).await??;

        self.inject_fault()?;
        Ok(a.wrapping_mul(b))
    }

    async fn divide(&self, _ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        self.inject_fault()?;

        if b == 0 {
            return Err(CalcError::DivisionByZero);
        }
        Ok((a as f64 / b as f64) as i64)
    }
}
