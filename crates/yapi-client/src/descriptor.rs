//! YApi interface descriptor records and interface ids.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An interface record as returned in the `data` field of `/api/interface/get`.
///
/// Only `_id`, `title` and `path` are required; everything else is passed through,
/// including fields not listed here. An explicit `null` stays `Some(Value::Null)` so it is
/// echoed back, while an absent field is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    #[serde(rename = "_id")]
    pub id: Value,
    pub title: Value,
    pub path: Value,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub method: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub desc: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub req_params: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub req_query: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub req_headers: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub req_body_type: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub req_body_form: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub req_body_other: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub res_body_type: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub res_body: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub markdown: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

pub(crate) const REQUIRED_FIELDS: [&str; 3] = ["_id", "title", "path"];

/// JavaScript-style truthiness, which is what YApi clients check fields against.
pub(crate) fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// An interface id, as a string or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiId {
    Number(serde_json::Number),
    Text(String),
}

impl ApiId {
    /// Value sent as the `id` query parameter.
    ///
    /// Interface page links such as `https://yapi.example.com/project/1/interface/api/66`
    /// are reduced to their trailing id (`66`).
    #[must_use]
    pub fn to_query_value(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => normalize_text_id(s).to_string(),
        }
    }
}

fn normalize_text_id(raw: &str) -> &str {
    const MARKER: &str = "/interface/api/";
    let s = raw.trim();
    let Some(idx) = s.rfind(MARKER) else {
        return s;
    };
    let tail = &s[idx + MARKER.len()..];
    let end = tail.find(['/', '?', '#']).unwrap_or(tail.len());
    let id = &tail[..end];
    if id.is_empty() { s } else { id }
}

impl fmt::Display for ApiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ApiId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ApiId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for ApiId {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}
