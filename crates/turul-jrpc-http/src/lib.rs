//! # JSON-RPC over HTTP
//!
//! Hyper-based HTTP/1.1 binding for the [`turul_jrpc`] engine. A single
//! endpoint path accepts POSTed payloads and answers with whatever the
//! engine renders.
//!
//! ```rust,no_run
//! use turul_jrpc::prelude::*;
//! use turul_jrpc_http::HttpRpcServer;
//!
//! # async fn example() -> turul_jrpc_http::Result<()> {
//! let mut registry = MethodRegistry::builder();
//! registry
//!     .method(
//!         "ping",
//!         handler_fn(|_ctx: RequestContext| async move { Ok::<_, RpcError>("pong") }),
//!     )
//!     .expect("unique method name");
//!
//! HttpRpcServer::builder()
//!     .bind_address("127.0.0.1:8080".parse().unwrap())
//!     .rpc_path("/rpc")
//!     .registry(registry.build())
//!     .build()
//!     .run()
//!     .await
//! # }
//! ```

pub mod cors;
pub mod handler;
pub mod server;

#[cfg(test)]
mod tests;

pub use cors::CorsLayer;
pub use handler::RpcHttpHandler;
pub use server::{HttpRpcServer, HttpRpcServerBuilder, ServerConfig};

/// Result type for the HTTP transport
pub type Result<T> = std::result::Result<T, TransportError>;

/// Transport-level failures. Request-level problems never surface here;
/// they are answered with a JSON-RPC error or an HTTP status instead.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
