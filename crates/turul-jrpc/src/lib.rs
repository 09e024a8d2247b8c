//! # JSON-RPC 2.0 Batch Routing Engine
//!
//! A transport-agnostic JSON-RPC 2.0 engine: it takes the raw bytes of a
//! single request or a batch, resolves every request against a
//! [`MethodRegistry`], runs the handlers of a batch concurrently and renders
//! the response bytes (or nothing, for notifications).
//!
//! ## Features
//! - Single and batch requests, notifications, null and typed ids
//! - Concurrent batch execution with cooperative cancellation
//! - Lazily decoded parameters, see [`Params`]
//! - Fallible, write-once registry construction with method groups
//! - Per-method response suppression (fire-and-forget handlers)
//!
//! ```rust,no_run
//! use turul_jrpc::prelude::*;
//!
//! # async fn run() -> Result<(), RegistryError> {
//! let mut registry = MethodRegistry::builder();
//! registry.method(
//!     "subtract",
//!     handler_fn(|ctx: RequestContext| async move {
//!         let [a, b]: [i64; 2] = ctx.require_params()?;
//!         Ok::<_, RpcError>(a - b)
//!     }),
//! )?;
//!
//! let engine = BatchEngine::new(registry.build());
//! let response = engine
//!     .handle(br#"{"jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": 1}"#)
//!     .await;
//! assert_eq!(response, br#"{"jsonrpc":"2.0","result":19,"id":1}"#);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod handler;
pub mod params;
pub mod pool;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use context::RequestContext;
pub use engine::{BatchEngine, EngineConfig};
pub use error::{BoxError, JsonRpcErrorCode, RegistryError, RpcError};
pub use handler::{FnHandler, HandlerResult, MethodHandler, handler_fn};
pub use params::Params;
pub use pool::{Task, WorkerPool};
pub use registry::{HandlerDescriptor, MethodGroup, MethodOptions, MethodRegistry, RegistryBuilder};
pub use request::RequestEnvelope;
pub use response::{JsonRpcMessage, PARSE_ERROR_RESPONSE, ResponseResult, ResultEntry, ToJson};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}
