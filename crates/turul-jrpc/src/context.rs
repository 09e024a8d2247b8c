use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::RpcError;
use crate::params::Params;
use crate::types::RequestId;

/// Per-invocation state handed to a method handler
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: String,
    id: RequestId,
    params: Params,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new(
        method: impl Into<String>,
        id: RequestId,
        params: Params,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            method: method.into(),
            id,
            params,
            cancellation,
        }
    }

    /// Fully-qualified method name as sent by the client
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_notification()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Shorthand for `params().decode()`
    pub fn params_to<T: DeserializeOwned>(&self) -> Result<Option<T>, RpcError> {
        self.params.decode()
    }

    /// Shorthand for `params().require()`
    pub fn require_params<T: DeserializeOwned>(&self) -> Result<T, RpcError> {
        self.params.require()
    }

    /// Cancellation signal of the batch this request belongs to. Long-running
    /// handlers should select on `cancellation().cancelled()`.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
