//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

use chaos_calculator::calculator::{CalcError, Calculator, Operation};
use chaos_calculator::config::ServerConfig;
use chaos_calculator::dependency::{Dependency, DependencyError};
use chaos_calculator::{CalculatorServer, Context, Shutdown};

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, String>,
    /// Name of the span the event was emitted in.
    pub span: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Default)]
struct FieldMap(BTreeMap<String, String>);

impl Visit for FieldMap {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

/// Everything seen by a [`CaptureLayer`].
#[derive(Clone, Default)]
pub struct Captured {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

impl Captured {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Spans that have closed so far.
    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }
}

pub struct CaptureLayer {
    captured: Captured,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: LayerContext<'_, S>) {
        let mut fields = FieldMap::default();
        attrs.record(&mut fields);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(fields);
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: LayerContext<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(fields) = span.extensions_mut().get_mut::<FieldMap>() {
                values.record(fields);
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: LayerContext<'_, S>) {
        let mut fields = FieldMap::default();
        event.record(&mut fields);
        let message = fields.0.remove("message").unwrap_or_default();
        let span = ctx.event_span(event).map(|s| s.name().to_string());

        self.captured.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields: fields.0,
            span,
        });
    }

    fn on_close(&self, id: Id, ctx: LayerContext<'_, S>) {
        if let Some(span) = ctx.span(&id) {
            let fields = span
                .extensions_mut()
                .remove::<FieldMap>()
                .map(|f| f.0)
                .unwrap_or_default();
            self.captured.spans.lock().unwrap().push(CapturedSpan {
                name: span.name().to_string(),
                fields,
            });
        }
    }
}

/// A subscriber recording every event and closed span.
///
/// Install with `tracing::subscriber::set_default` on a current-thread runtime.
pub fn capture() -> (impl Subscriber + Send + Sync, Captured) {
    let captured = Captured::default();
    let layer = CaptureLayer {
        captured: captured.clone(),
    };
    (Registry::default().with(layer), captured)
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

type Script = dyn Fn(Operation, i64, i64) -> Result<i64, CalcError> + Send + Sync;

/// Calculator whose outcome is decided by a closure. Counts calls.
pub struct ScriptedCalculator {
    script: Box<Script>,
    pub calls: AtomicUsize,
}

impl ScriptedCalculator {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(Operation, i64, i64) -> Result<i64, CalcError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn run(&self, op: Operation, a: i64, b: i64) -> Result<i64, CalcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(op, a, b)
    }
}

#[async_trait]
impl Calculator for ScriptedCalculator {
    async fn add(&self, _ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        self.run(Operation::Add, a, b)
    }

    async fn subtract(&self, _ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        self.run(Operation::Subtract, a, b)
    }

    async fn multiply(&self, _ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        self.run(Operation::Multiply, a, b)
    }

    async fn divide(&self, _ctx: &Context, a: i64, b: i64) -> Result<i64, CalcError> {
        self.run(Operation::Divide, a, b)
    }
}

/// Calculator that never finishes on its own; it resolves only when the
/// context does, with the context's error.
pub struct StalledCalculator;

impl StalledCalculator {
    async fn stall(ctx: &Context) -> Result<i64, CalcError> {
        ctx.done().await;
        Err(ctx.err().unwrap_or(chaos_calculator::ContextError::Canceled).into())
    }
}

#[async_trait]
impl Calculator for StalledCalculator {
    async fn add(&self, ctx: &Context, _a: i64, _b: i64) -> Result<i64, CalcError> {
        Self::stall(ctx).await
    }

    async fn subtract(&self, ctx: &Context, _a: i64, _b: i64) -> Result<i64, CalcError> {
        Self::stall(ctx).await
    }

    async fn multiply(&self, ctx: &Context, _a: i64, _b: i64) -> Result<i64, CalcError> {
        Self::stall(ctx).await
    }

    async fn divide(&self, ctx: &Context, _a: i64, _b: i64) -> Result<i64, CalcError> {
        Self::stall(ctx).await
    }
}

/// Dependency with a fixed delay and outcome.
#[derive(Default)]
pub struct StubDependency {
    pub delay: Duration,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubDependency {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dependency for StubDependency {
    async fn call(&self, _ctx: &Context) -> Result<(), DependencyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(DependencyError::EmptyBody);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, op: Operation) -> String {
        format!(
            "http://{}{}",
            self.addr,
            chaos_calculator::http::rpc_path(op)
        )
    }
}

/// Start a server for `calculator` bound on `127.0.0.1:0`.
pub async fn start_server(calculator: Arc<dyn Calculator>) -> TestServer {
    start_server_with(ServerConfig::default(), calculator).await
}

pub async fn start_server_with(config: ServerConfig, calculator: Arc<dyn Calculator>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = CalculatorServer::new(&config, calculator);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
