//! # JSON-RPC Engine Prelude
//!
//! Convenient re-exports of the types most handlers and hosts need.
//!
//! ```rust
//! use turul_jrpc::prelude::*;
//! ```

pub use crate::context::RequestContext;
pub use crate::engine::{BatchEngine, EngineConfig};
pub use crate::error::{BoxError, RegistryError, RpcError};
pub use crate::handler::{HandlerResult, MethodHandler, handler_fn};
pub use crate::params::Params;
pub use crate::registry::{MethodOptions, MethodRegistry, RegistryBuilder};
pub use crate::response::ResponseResult;
pub use crate::types::RequestId;

// Standard error codes
pub use crate::error_codes::*;
