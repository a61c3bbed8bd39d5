//! End-to-end failure injection tests: real executor, real decorator chain,
//! real server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use chaos_calculator::calculator::{CalculatorService, Operation, SimulationSettings};
use chaos_calculator::chaos::FaultInjector;
use chaos_calculator::config::MiddlewareConfig;
use chaos_calculator::http::{ErrorBody, OperationResponse, X_REQUEST_TIMEOUT_MS};
use chaos_calculator::middleware::build_chain;

mod common;
use common::{http_client, start_server, StubDependency, TestServer};

fn small_settings() -> SimulationSettings {
    SimulationSettings {
        memory_bytes: 4096,
        blocking_wait: Duration::from_millis(200),
        dependency_timeout: Duration::from_millis(100),
    }
}

async fn start(
    dependency: Arc<StubDependency>,
    faults: FaultInjector,
    settings: SimulationSettings,
) -> TestServer {
    let service = CalculatorService::new(dependency, faults, settings);
    start_server(build_chain(service, &MiddlewareConfig::default())).await
}

async fn post(server: &TestServer, op: Operation, deadline_ms: Option<u64>) -> reqwest::Response {
    let mut req = http_client()
        .post(server.url(op))
        .json(&json!({"a": 18, "b": 3}));
    if let Some(ms) = deadline_ms {
        req = req.header(X_REQUEST_TIMEOUT_MS, ms.to_string());
    }
    req.send().await.expect("server unreachable")
}

#[tokio::test]
async fn healthy_service_answers_every_operation() {
    let dependency = Arc::new(StubDependency::ok());
    let server = start(dependency.clone(), FaultInjector::never(), small_settings()).await;

    for (op, expected) in [
        (Operation::Add, 21),
        (Operation::Subtract, 15),
        (Operation::Multiply, 54),
        (Operation::Divide, 6),
    ] {
        let res = post(&server, op, None).await;
        assert_eq!(res.status(), StatusCode::OK, "{op}");
        let body: OperationResponse = res.json().await.unwrap();
        assert_eq!(body.result, expected, "{op}");
    }
    assert_eq!(dependency.call_count(), 1);

    server.shutdown.trigger();
}

#[tokio::test]
async fn forced_faults_fail_every_operation() {
    let server = start(
        Arc::new(StubDependency::ok()),
        FaultInjector::always(),
        small_settings(),
    )
    .await;

    for op in Operation::ALL {
        let res = post(&server, op, None).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "{op}");
        let body: ErrorBody = res.json().await.unwrap();
        assert_eq!(body.code, "unknown");
        assert_eq!(body.message, "random error");
    }

    server.shutdown.trigger();
}

#[tokio::test]
async fn failing_dependency_fails_only_multiply() {
    let server = start(
        Arc::new(StubDependency::failing()),
        FaultInjector::never(),
        small_settings(),
    )
    .await;

    let res = post(&server, Operation::Multiply, None).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.message, "response body is empty");

    let res = post(&server, Operation::Add, None).await;
    assert_eq!(res.status(), StatusCode::OK);

    server.shutdown.trigger();
}

#[tokio::test]
async fn slow_dependency_hits_the_multiply_timeout() {
    let server = start(
        Arc::new(StubDependency::slow(Duration::from_secs(10))),
        FaultInjector::never(),
        small_settings(),
    )
    .await;

    let res = post(&server, Operation::Multiply, None).await;
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.message, "context deadline exceeded");

    server.shutdown.trigger();
}

#[tokio::test]
async fn add_aborts_its_fill_on_client_deadline() {
    let settings = SimulationSettings {
        memory_bytes: 64 * 1024 * 1024,
        ..small_settings()
    };
    let server = start(Arc::new(StubDependency::ok()), FaultInjector::never(), settings).await;

    let res = post(&server, Operation::Add, Some(1)).await;
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.code, "deadline_exceeded");

    server.shutdown.trigger();
}

#[tokio::test]
async fn subtract_finishes_past_the_client_deadline() {
    let server = start(
        Arc::new(StubDependency::ok()),
        FaultInjector::never(),
        small_settings(),
    )
    .await;

    // The deadline passes during the wait, which is never interrupted.
    let res = post(&server, Operation::Subtract, Some(50)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: OperationResponse = res.json().await.unwrap();
    assert_eq!(body.result, 15);

    server.shutdown.trigger();
}
