//! Request envelope
//!
//! A request object is split into its members without decoding them. Each
//! member stays raw JSON text, so the `id` is echoed and the `params` reach
//! the handler exactly as the client sent them.

use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

use crate::params::Params;
use crate::types::{JsonRpcVersion, RequestId};

/// Members of one request object. `None` means the member is absent; an
/// explicit `null` is kept as the raw text `null`.
#[derive(Debug, Default, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, deserialize_with = "present")]
    jsonrpc: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present")]
    method: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present")]
    id: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present")]
    params: Option<Box<RawValue>>,
}

// Without this, serde maps `null` to `None` and an explicit null id would
// look like a notification.
fn present<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

impl RequestEnvelope {
    /// Split a raw request into its members.
    ///
    /// Returns `None` for anything that is not a JSON object, and for an
    /// object that repeats one of the known members.
    pub fn parse(raw: &RawValue) -> Option<Self> {
        if !raw.get().trim_start().starts_with('{') {
            return None;
        }
        serde_json::from_str(raw.get()).ok()
    }

    pub fn id(&self) -> RequestId {
        RequestId::from_raw(self.id.as_deref())
    }

    /// The method name, if it is a non-empty string
    pub fn method(&self) -> Option<String> {
        let raw = self.method.as_deref()?;
        serde_json::from_str::<String>(raw.get())
            .ok()
            .filter(|method| !method.is_empty())
    }

    /// True when `jsonrpc` is the string `"2.0"`
    pub fn version_matches(&self) -> bool {
        JsonRpcVersion::matches(self.jsonrpc.as_deref())
    }

    pub fn raw_params(&self) -> Option<&str> {
        self.params.as_deref().map(RawValue::get)
    }

    /// Hand the `params` member over to a [`Params`] carrier
    pub fn into_params(self) -> Params {
        self.params.map(Params::from_raw).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> Option<RequestEnvelope> {
        let raw: Box<RawValue> = serde_json::from_str(json).unwrap();
        RequestEnvelope::parse(&raw)
    }

    #[test]
    fn test_params_kept_verbatim() {
        let request = envelope(
            r#"{"jsonrpc": "2.0", "method": "m", "params": {"zeta":1,"alpha":12345678901234567890123}, "id": 1}"#,
        )
        .unwrap();

        assert_eq!(
            request.raw_params(),
            Some(r#"{"zeta":1,"alpha":12345678901234567890123}"#)
        );
        assert_eq!(
            request.into_params().raw(),
            Some(r#"{"zeta":1,"alpha":12345678901234567890123}"#)
        );
    }

    #[test]
    fn test_absent_and_null_members() {
        let request = envelope(r#"{"method": "m", "params": null, "id": null}"#).unwrap();
        assert_eq!(request.id(), RequestId::Null);
        assert!(!request.into_params().is_present());

        let request = envelope(r#"{"method": "m"}"#).unwrap();
        assert_eq!(request.id(), RequestId::Notification);
        assert_eq!(request.raw_params(), None);
    }

    #[test]
    fn test_method_must_be_non_empty_string() {
        assert_eq!(
            envelope(r#"{"method": "sum"}"#).unwrap().method().as_deref(),
            Some("sum")
        );
        assert_eq!(envelope(r#"{"method": ""}"#).unwrap().method(), None);
        assert_eq!(envelope(r#"{"method": 1}"#).unwrap().method(), None);
        assert_eq!(envelope(r#"{"params": []}"#).unwrap().method(), None);
    }

    #[test]
    fn test_escaped_method_name_is_decoded() {
        let request = envelope(r#"{"method": "a\u002eb"}"#).unwrap();
        assert_eq!(request.method().as_deref(), Some("a.b"));
    }

    #[test]
    fn test_non_objects_are_rejected() {
        for json in ["1", "\"x\"", "[1, 2]", "null", "true"] {
            assert!(envelope(json).is_none(), "{json} should not parse");
        }
    }

    #[test]
    fn test_unknown_members_are_ignored() {
        let request = envelope(r#"{"method": "m", "extra": {"deep": [1]}, "id": 2}"#).unwrap();
        assert_eq!(request.id(), RequestId::Integer(2));
    }

    #[test]
    fn test_version_member() {
        assert!(envelope(r#"{"jsonrpc": "2.0"}"#).unwrap().version_matches());
        assert!(!envelope(r#"{"jsonrpc": "1.0"}"#).unwrap().version_matches());
        assert!(!envelope(r#"{"jsonrpc": 2.0}"#).unwrap().version_matches());
        assert!(!envelope(r#"{"method": "m"}"#).unwrap().version_matches());
    }
}
