//! Transport adapter: one handler per operation.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::calculator::{Calculator, Operation};
use crate::http::request::{request_context, OperationRequest};
use crate::http::response::{OperationResponse, RpcError};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<dyn Calculator>,
}

pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<OperationRequest>, JsonRejection>,
) -> Response {
    invoke(Operation::Add, &state, &headers, body).await
}

pub async fn subtract(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<OperationRequest>, JsonRejection>,
) -> Response {
    invoke(Operation::Subtract, &state, &headers, body).await
}

pub async fn multiply(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<OperationRequest>, JsonRejection>,
) -> Response {
    invoke(Operation::Multiply, &state, &headers, body).await
}

pub async fn divide(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<OperationRequest>, JsonRejection>,
) -> Response {
    invoke(Operation::Divide, &state, &headers, body).await
}

async fn invoke(
    op: Operation,
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Json<OperationRequest>, JsonRejection>,
) -> Response {
    let start_time = Instant::now();

    match dispatch(op, state, headers, body).await {
        Ok(result) => {
            metrics::record_rpc(op.as_str(), "ok", start_time);
            (StatusCode::OK, Json(OperationResponse { result })).into_response()
        }
        Err(err) => {
            tracing::debug!(method = %op, code = err.code().as_str(), "RPC failed");
            metrics::record_rpc(op.as_str(), err.code().as_str(), start_time);
            err.into_response()
        }
    }
}

async fn dispatch(
    op: Operation,
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<i64, RpcError> {
    let Json(request) = body?;
    // Held until the call returns; dropping the handler cancels the context.
    let (ctx, _guard) = request_context(headers)?;

    let result = state.calculator.call(op, &ctx, request.a, request.b).await?;
    Ok(result)
}
