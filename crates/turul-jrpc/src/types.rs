use std::fmt;

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::{Number, Value};

/// Classification of the `id` member of a single request object.
///
/// `Notification` and `Null` both render as `null`; the difference is that a
/// notification never produces a response entry.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestId {
    /// `id` member absent
    Notification,
    /// `id` present and `null`, or present with a type JSON-RPC does not allow
    Null,
    String(String),
    Integer(i64),
    /// Any other number (`1.5`, `1e2`, `18446744073709551615`), kept in the
    /// exact text the client sent
    Number(String),
}

impl RequestId {
    /// Resolve the raw `id` member of a request envelope.
    ///
    /// Classification looks only at presence and JSON type of `id`, never at
    /// its value. Booleans, arrays and objects are not rejected here; they
    /// render as `null`.
    pub fn from_raw(id: Option<&RawValue>) -> Self {
        let Some(id) = id else {
            return RequestId::Notification;
        };

        let text = id.get();
        match text.as_bytes().first().copied() {
            Some(b'"') => serde_json::from_str(text).map_or(RequestId::Null, RequestId::String),
            Some(b'-' | b'0'..=b'9') => match text.parse::<i64>() {
                // "-0" would come back as "0"
                Ok(int) if text != "-0" => RequestId::Integer(int),
                _ => RequestId::Number(text.to_string()),
            },
            _ => RequestId::Null,
        }
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, RequestId::Notification)
    }

    /// True for string and numeric ids
    pub fn is_typed(&self) -> bool {
        matches!(
            self,
            RequestId::String(_) | RequestId::Integer(_) | RequestId::Number(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// JSON value echoed in the response `id` member. Numbers outside the
    /// `i64` range go through `f64` here; rendering keeps their text.
    pub fn to_value(&self) -> Value {
        match self {
            RequestId::Notification | RequestId::Null => Value::Null,
            RequestId::String(s) => Value::String(s.clone()),
            RequestId::Integer(n) => Value::from(*n),
            RequestId::Number(text) => serde_json::from_str(text).unwrap_or(Value::Null),
        }
    }
}

/// Renders the wire form: `null`, `"abc"`, `7`, `1e2`
impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(text) => f.write_str(text),
            other => write!(f, "{}", other.to_value()),
        }
    }
}

impl Serialize for RequestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RequestId::Notification | RequestId::Null => serializer.serialize_unit(),
            RequestId::String(s) => serializer.serialize_str(s),
            RequestId::Integer(n) => serializer.serialize_i64(*n),
            RequestId::Number(text) => RawValue::from_string(text.clone())
                .map_err(S::Error::custom)?
                .serialize(serializer),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Integer(n)
    }
}

/// Non-finite values have no JSON form and become `Null`
impl From<f64> for RequestId {
    fn from(f: f64) -> Self {
        Number::from_f64(f).map_or(RequestId::Null, |n| RequestId::Number(n.to_string()))
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

/// JSON-RPC version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonRpcVersion {
    #[default]
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => "2.0",
        }
    }

    /// True when the raw `jsonrpc` member is the string `"2.0"`
    pub fn matches(member: Option<&RawValue>) -> bool {
        member
            .and_then(|raw| serde_json::from_str::<String>(raw.get()).ok())
            .is_some_and(|version| version == JsonRpcVersion::V2_0.as_str())
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
