//! RPC transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, request id, trace, read/write timeouts)
//!     → request.rs (decode `{a, b}`, derive the per-request context)
//!     → handlers.rs (invoke the decorated operation, record metrics)
//!     → response.rs (`{result}` or `{code, message}` with a mapped status)
//!     → Send to client
//! ```
//!
//! Each operation is `POST /calculator.Calculator/<Op>`.

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{OperationRequest, X_REQUEST_ID, X_REQUEST_TIMEOUT_MS};
pub use response::{ErrorBody, OperationResponse, RpcCode, RpcError};
pub use server::{rpc_path, CalculatorServer};
