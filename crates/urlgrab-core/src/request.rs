//! Validation of relay requests, independent of the HTTP framework.

use crate::error::RelayError;
use serde::Deserialize;
use serde_json::Value;

/// Raw JSON body of a relay request. Both fields are untyped so validation,
/// not deserialization, reports which one is wrong.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayRequest {
    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub action: Option<Value>,
}

/// What the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Info,
    Download,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Info => "info",
            Action::Download => "download",
        }
    }
}

/// A request that passed validation; no network I/O has happened yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest {
    pub url: String,
    pub action: Action,
}

impl RelayRequest {
    /// Checks `url` then `action`, in that order.
    ///
    /// `null`, `false`, `0` and `""` count as a missing URL. Any other
    /// non-string is a malformed one. The URL must parse and use
    /// `http`/`https`; it is passed on exactly as the caller sent it.
    pub fn validate(self) -> Result<ValidRequest, RelayError> {
        let url = match self.url {
            None => return Err(RelayError::invalid("URL is required")),
            Some(v) if is_empty_value(&v) => return Err(RelayError::invalid("URL is required")),
            Some(Value::String(u)) => u,
            Some(_) => return Err(RelayError::invalid("Invalid URL format")),
        };
        if !crate::url_model::is_valid_url(&url) {
            return Err(RelayError::invalid("Invalid URL format"));
        }

        let action = match self.action.as_ref().and_then(|v| v.as_str()) {
            Some("info") => Action::Info,
            Some("download") => Action::Download,
            _ => return Err(RelayError::invalid("Invalid action")),
        };

        Ok(ValidRequest { url, action })
    }
}

fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
