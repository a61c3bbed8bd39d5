//! Request spans for the transport layer.
//!
//! `TraceLayer` opens one span per HTTP request carrying the request id, so
//! the operation span opened by the tracing decorator nests under it and
//! every log line of a call can be correlated.

use axum::body::Body;
use axum::http::Request;
use tracing::Span;

use crate::http::request::X_REQUEST_ID;

/// Span factory for `TraceLayer::make_span_with`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "rpc",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
