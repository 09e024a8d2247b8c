use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::RpcError;

/// Raw, not yet decoded `params` fragment of one request.
///
/// The engine only records whether params are present; decoding into a
/// concrete shape is left to the handler.
#[derive(Debug, Clone, Default)]
pub struct Params {
    raw: Option<Box<RawValue>>,
}

impl Params {
    /// Params carrier with nothing bound
    pub fn none() -> Self {
        Self { raw: None }
    }

    /// Wrap the raw `params` member of a request. An explicit `null` binds
    /// nothing, the same as a missing member.
    pub fn from_raw(raw: Box<RawValue>) -> Self {
        if raw.get() == "null" {
            return Self::none();
        }
        Self { raw: Some(raw) }
    }

    pub fn is_present(&self) -> bool {
        self.raw.is_some()
    }

    /// Raw JSON text of the fragment
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref().map(RawValue::get)
    }

    /// Decode into `T`. Absent params yield `Ok(None)`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>, RpcError> {
        let Some(raw) = self.raw.as_deref() else {
            return Ok(None);
        };

        serde_json::from_str(raw.get())
            .map(Some)
            .map_err(|_| RpcError::invalid_params(None))
    }

    /// Decode into `T`, treating absent params as invalid
    pub fn require<T: DeserializeOwned>(&self) -> Result<T, RpcError> {
        self.decode()?
            .ok_or_else(|| RpcError::invalid_params(None))
    }
}
