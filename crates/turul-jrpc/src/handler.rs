use std::future::Future;

use async_trait::async_trait;
use serde::Serialize;

use crate::context::RequestContext;
use crate::error::BoxError;
use crate::response::ResponseResult;

/// Value returned by every method handler
pub type HandlerResult = Result<ResponseResult, BoxError>;

/// Trait for handling one JSON-RPC method
///
/// Handlers of one batch run concurrently with each other, so implementations
/// must not assume exclusive access to shared state.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Handle a call. Return an [`RpcError`](crate::RpcError) for protocol
    /// level failures; any other error is reported as an internal error.
    async fn call(&self, ctx: RequestContext) -> HandlerResult;
}

/// A closure-based handler, see [`handler_fn`]
pub struct FnHandler<F> {
    handler_fn: F,
}

#[async_trait]
impl<F, Fut, R, E> MethodHandler for FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Serialize + Send + Sync + 'static,
    E: Into<BoxError>,
{
    async fn call(&self, ctx: RequestContext) -> HandlerResult {
        match (self.handler_fn)(ctx).await {
            Ok(value) => Ok(ResponseResult::deferred(value)),
            Err(error) => Err(error.into()),
        }
    }
}

/// Adapt an async closure into a [`MethodHandler`].
///
/// ```rust
/// use turul_jrpc::{handler_fn, RequestContext, RpcError};
///
/// let subtract = handler_fn(|ctx: RequestContext| async move {
///     let [a, b]: [i64; 2] = ctx.require_params()?;
///     Ok::<_, RpcError>(a - b)
/// });
/// # let _ = subtract;
/// ```
pub fn handler_fn<F, Fut, R, E>(handler_fn: F) -> FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Serialize + Send + Sync + 'static,
    E: Into<BoxError>,
{
    FnHandler { handler_fn }
}
