use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::RpcError;
use crate::types::{JsonRpcVersion, RequestId};

/// Anything that can produce its JSON form on demand
pub trait ToJson {
    fn to_json(&self) -> serde_json::Result<Value>;
}

impl<T> ToJson for T
where
    T: Serialize + ?Sized,
{
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Result data produced by a handler
pub enum ResponseResult {
    /// `"result": null`
    Null,
    /// Already encoded value
    Success(Value),
    /// Serialized at render time; failure degrades to an internal error
    Deferred(Box<dyn ToJson + Send + Sync>),
}

impl ResponseResult {
    pub fn success(value: Value) -> Self {
        ResponseResult::Success(value)
    }

    pub fn null() -> Self {
        ResponseResult::Null
    }

    pub fn deferred<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        ResponseResult::Deferred(Box::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ResponseResult::Null)
    }

    pub fn into_value(self) -> serde_json::Result<Value> {
        match self {
            ResponseResult::Null => Ok(Value::Null),
            ResponseResult::Success(value) => Ok(value),
            ResponseResult::Deferred(value) => value.to_json(),
        }
    }
}

impl fmt::Debug for ResponseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseResult::Null => f.write_str("Null"),
            ResponseResult::Success(value) => f.debug_tuple("Success").field(value).finish(),
            ResponseResult::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<Value> for ResponseResult {
    fn from(value: Value) -> Self {
        if value.is_null() {
            ResponseResult::Null
        } else {
            ResponseResult::Success(value)
        }
    }
}

impl From<()> for ResponseResult {
    fn from(_: ()) -> Self {
        ResponseResult::Null
    }
}

/// Outcome of one dispatched request, consumed once by rendering
#[derive(Debug)]
pub struct ResultEntry {
    pub id: RequestId,
    pub outcome: Result<ResponseResult, RpcError>,
}

impl ResultEntry {
    pub fn success(id: RequestId, result: ResponseResult) -> Self {
        Self {
            id,
            outcome: Ok(result),
        }
    }

    pub fn error(id: RequestId, error: RpcError) -> Self {
        Self {
            id,
            outcome: Err(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Resolve the entry into its wire object. Result serialization failures
    /// become an internal error bound to the same id.
    pub fn into_message(self) -> JsonRpcMessage {
        match self.outcome {
            Ok(result) => match result.into_value() {
                Ok(value) => JsonRpcMessage::success(self.id, value),
                Err(err) => JsonRpcMessage::error(
                    self.id,
                    RpcError::internal_error(Some(format!(
                        "error during marshaling result: {err}"
                    ))),
                ),
            },
            Err(error) => JsonRpcMessage::error(self.id, error),
        }
    }
}

/// A successful JSON-RPC response object
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub result: Value,
    pub id: RequestId,
}

/// An error JSON-RPC response object
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub error: RpcError,
    pub id: RequestId,
}

impl JsonRpcError {
    pub fn new(id: RequestId, error: RpcError) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            error,
            id,
        }
    }
}

/// Either a success or an error object; the two never share a `result` and
/// an `error` member.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Response(JsonRpcResponse),
    Error(JsonRpcError),
}

impl JsonRpcMessage {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self::Response(JsonRpcResponse {
            version: JsonRpcVersion::V2_0,
            result,
            id,
        })
    }

    pub fn error(id: RequestId, error: RpcError) -> Self {
        Self::Error(JsonRpcError::new(id, error))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcMessage::Error(_))
    }

    pub fn id(&self) -> &RequestId {
        match self {
            JsonRpcMessage::Response(resp) => &resp.id,
            JsonRpcMessage::Error(err) => &err.id,
        }
    }
}

/// Pre-rendered responses for failures that end the whole call.
/// The parse error is public so transports can answer unreadable bodies.
pub const PARSE_ERROR_RESPONSE: &[u8] =
    br#"{"jsonrpc":"2.0","error":{"code":-32700,"message":"Parse error"},"id":null}"#;
pub(crate) const INVALID_REQUEST_RESPONSE: &[u8] =
    br#"{"jsonrpc":"2.0","error":{"code":-32600,"message":"Invalid Request"},"id":null}"#;
pub(crate) const INTERNAL_ERROR_RESPONSE: &[u8] =
    br#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"},"id":null}"#;

/// Render collected entries.
///
/// No entries renders nothing. A batch is always array-wrapped, a single
/// request never is.
pub fn render(entries: Vec<ResultEntry>, is_batch: bool) -> Vec<u8> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut messages: Vec<JsonRpcMessage> =
        entries.into_iter().map(ResultEntry::into_message).collect();

    let rendered = if is_batch {
        serde_json::to_vec(&messages)
    } else {
        match messages.pop() {
            Some(message) => serde_json::to_vec(&message),
            None => return Vec::new(),
        }
    };

    rendered.unwrap_or_else(|_| INTERNAL_ERROR_RESPONSE.to_vec())
}
