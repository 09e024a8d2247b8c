use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::error_codes;

/// Boxed failure returned by method handlers.
///
/// A handler that returns an [`RpcError`] (directly or through `?`) has it
/// rendered as-is; any other error becomes an internal error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Any application-defined code
    Custom(i64),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::Custom(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::Custom(_) => "Server error",
        }
    }

    /// Map a numeric code back onto the catalog
    pub fn from_code(code: i64) -> Self {
        match code {
            error_codes::PARSE_ERROR => JsonRpcErrorCode::ParseError,
            error_codes::INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            error_codes::INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            error_codes::INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            other => JsonRpcErrorCode::Custom(other),
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC error object, embedded verbatim as the `error` member of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Every constructor below falls back to the catalog message when
    /// `message` is `None`.
    pub fn new(code: JsonRpcErrorCode, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data,
        }
    }

    pub fn parse_error(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::ParseError, message, None)
    }

    pub fn invalid_request(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, message, None)
    }

    pub fn method_not_found(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::MethodNotFound, message, None)
    }

    pub fn invalid_params(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, message, None)
    }

    pub fn internal_error(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, message, None)
    }

    /// Handler-defined error with an arbitrary code
    pub fn custom(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn kind(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }

    /// Normalize a handler failure: `RpcError`s pass through untouched,
    /// anything else becomes an internal error carrying its description.
    pub fn from_handler_error(error: BoxError) -> Self {
        match error.downcast::<RpcError>() {
            Ok(rpc_error) => *rpc_error,
            Err(other) => Self::internal_error(Some(other.to_string())),
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// Errors raised while building a method registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("method '{0}' is already registered")]
    DuplicateMethod(String),

    #[error("method name must not be empty")]
    EmptyMethodName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        assert_eq!(JsonRpcErrorCode::ParseError.code(), -32700);
        assert_eq!(JsonRpcErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(JsonRpcErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(JsonRpcErrorCode::InvalidParams.code(), -32602);
        assert_eq!(JsonRpcErrorCode::InternalError.code(), -32603);
        assert_eq!(JsonRpcErrorCode::from_code(-32601), JsonRpcErrorCode::MethodNotFound);
        assert_eq!(JsonRpcErrorCode::from_code(42), JsonRpcErrorCode::Custom(42));
    }

    #[test]
    fn test_default_and_override_messages() {
        assert_eq!(RpcError::parse_error(None).message, "Parse error");
        assert_eq!(RpcError::invalid_request(None).message, "Invalid Request");
        assert_eq!(RpcError::method_not_found(None).message, "Method not found");
        assert_eq!(RpcError::invalid_params(None).message, "Invalid params");
        assert_eq!(RpcError::internal_error(None).message, "Internal error");

        let err = RpcError::invalid_params(Some("expected two numbers".to_string()));
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "expected two numbers");
    }

    #[test]
    fn test_error_serialization_omits_missing_data() {
        let json = serde_json::to_string(&RpcError::method_not_found(None)).unwrap();
        assert_eq!(json, r#"{"code":-32601,"message":"Method not found"}"#);
    }

    #[test]
    fn test_error_serialization_with_data() {
        let err = RpcError::internal_error(None).with_data(json!({"key": "value"}));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({"code": -32603, "message": "Internal error", "data": {"key": "value"}})
        );
    }

    #[test]
    fn test_custom_error_keeps_code() {
        let err = RpcError::custom(4001, "insufficient funds", Some(json!(12)));
        assert_eq!(err.kind(), JsonRpcErrorCode::Custom(4001));
        assert_eq!(err.data, Some(json!(12)));
    }

    #[test]
    fn test_handler_error_normalization() {
        let rpc: BoxError = Box::new(RpcError::invalid_params(None));
        assert_eq!(
            RpcError::from_handler_error(rpc),
            RpcError::invalid_params(None)
        );

        let io: BoxError = Box::new(std::io::Error::other("disk on fire"));
        let normalized = RpcError::from_handler_error(io);
        assert_eq!(normalized.code, -32603);
        assert_eq!(normalized.message, "disk on fire");

        let plain: BoxError = "random error".into();
        assert_eq!(RpcError::from_handler_error(plain).message, "random error");
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::DuplicateMethod("math.add".to_string());
        assert_eq!(err.to_string(), "method 'math.add' is already registered");
    }
}
