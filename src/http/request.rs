//! Request decoding and per-request context.
//!
//! # Responsibilities
//! - Decode the two operands (missing fields are zero)
//! - Derive the root [`Context`] for the call, with a client deadline when
//!   `x-request-timeout-ms` is present
//!
//! # Design Decisions
//! - The context's guard lives in the handler future, so a dropped request
//!   cancels in-flight work
//! - An unparsable deadline header rejects the call before it runs

use std::time::Duration;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::context::{CancelGuard, Context};
use crate::http::response::RpcError;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Client deadline for the whole call, in milliseconds.
pub const X_REQUEST_TIMEOUT_MS: &str = "x-request-timeout-ms";

/// Wire request shared by all four operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRequest {
    #[serde(default)]
    pub a: i64,
    #[serde(default)]
    pub b: i64,
}

/// Build the context a single RPC runs under.
pub fn request_context(headers: &HeaderMap) -> Result<(Context, CancelGuard), RpcError> {
    let root = Context::background();
    let Some(value) = headers.get(X_REQUEST_TIMEOUT_MS) else {
        return Ok(root.child());
    };

    let millis = value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| {
            RpcError::invalid_argument(format!("invalid {X_REQUEST_TIMEOUT_MS} header"))
        })?;

    Ok(root.with_timeout(Duration::from_millis(millis)))
}
