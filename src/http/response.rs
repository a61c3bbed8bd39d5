//! Response encoding and error status mapping.
//!
//! | Error                        | Status | Code                |
//! |------------------------------|--------|---------------------|
//! | context canceled             | 499    | `canceled`          |
//! | context deadline exceeded    | 504    | `deadline_exceeded` |
//! | injected fault, dependency   | 500    | `unknown`           |
//! | division by zero, bad input  | 400    | `invalid_argument`  |
//! | worker failure               | 500    | `internal`          |
//!
//! The message is always the error's own text, unchanged.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::calculator::CalcError;
use crate::context::ContextError;

/// Successful wire response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub result: i64,
}

/// Error wire response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Transport-level error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCode {
    Canceled,
    DeadlineExceeded,
    Unknown,
    InvalidArgument,
    Internal,
}

impl RpcCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            RpcCode::Canceled => "canceled",
            RpcCode::DeadlineExceeded => "deadline_exceeded",
            RpcCode::Unknown => "unknown",
            RpcCode::InvalidArgument => "invalid_argument",
            RpcCode::Internal => "internal",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            // Client closed request (nginx convention).
            RpcCode::Canceled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            RpcCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            RpcCode::Unknown | RpcCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            RpcCode::InvalidArgument => StatusCode::BAD_REQUEST,
        }
    }
}

/// An error on its way to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    code: RpcCode,
    message: String,
}

impl RpcError {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(RpcCode::InvalidArgument, message)
    }

    pub fn code(&self) -> RpcCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CalcError> for RpcError {
    fn from(err: CalcError) -> Self {
        let code = match &err {
            CalcError::Context(ContextError::Canceled) => RpcCode::Canceled,
            CalcError::Context(ContextError::DeadlineExceeded) => RpcCode::DeadlineExceeded,
            CalcError::Injected | CalcError::Dependency(_) => RpcCode::Unknown,
            CalcError::DivisionByZero => RpcCode::InvalidArgument,
            CalcError::Worker(_) => RpcCode::Internal,
        };
        Self::new(code, err.to_string())
    }
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_argument(rejection.body_text())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.as_str().to_string(),
            message: self.message,
        };
        (self.code.status(), Json(body)).into_response()
    }
}
