use chrono::{NaiveDateTime, Utc};

use crate::dates::parse_maybe_iso;
use crate::ipc::error::err;

/// Parameter-level failure, turned into an error envelope by `try_handle`.
pub struct ParamErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ParamErr {
    pub fn bad(message: impl Into<String>) -> Self {
        ParamErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

pub fn required_str(params: &serde_json::Value, key: &str) -> Result<String, ParamErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParamErr::bad(format!("missing {}", key)))
}

pub fn optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn optional_bool(params: &serde_json::Value, key: &str) -> bool {
    params.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

/// Every read accepts a pinned clock; tests rely on this. Defaults to
/// the wall clock.
pub fn now_from(params: &serde_json::Value) -> Result<NaiveDateTime, ParamErr> {
    match params.get("now").and_then(|v| v.as_str()) {
        None => Ok(Utc::now().naive_utc()),
        Some(raw) => parse_maybe_iso(raw)
            .ok_or_else(|| ParamErr::bad(format!("unparsable now: {}", raw))),
    }
}
