//! Caller descriptor and request envelope.

use crate::model::{DocumentId, Payload};
use crate::repo::{parse_document_id, RepoError, RepoResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Capability flags supplied by the session layer above the gateway.
///
/// Extra keys on the wire (for example `resource`) are ignored, and a
/// `null` flag reads as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Caller {
    #[serde(deserialize_with = "null_as_false")]
    pub admin: bool,
    #[serde(deserialize_with = "null_as_false")]
    pub write: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl Caller {
    pub fn admin() -> Self {
        Self {
            admin: true,
            write: false,
        }
    }

    pub fn writer() -> Self {
        Self {
            admin: false,
            write: true,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Either flag is enough.
    pub fn is_permitted(&self) -> bool {
        self.admin || self.write
    }
}

/// Request envelope. Only `content` is read; other keys pass through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub content: Option<Value>,
}

impl ActionRequest {
    pub fn new(content: Value) -> Self {
        Self {
            content: Some(content),
        }
    }

    /// A request without any content.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `content` when it is a JSON object.
    pub fn content_object(&self) -> Option<&Payload> {
        self.content.as_ref().and_then(Value::as_object)
    }

    /// Whether `content` is an object with at least one key.
    pub fn has_content(&self) -> bool {
        self.content_object().is_some_and(|content| !content.is_empty())
    }

    /// Whether `content.<key>` is present and truthy: not missing, `null`,
    /// `false`, zero or the empty string.
    pub fn has_field(&self, key: &str) -> bool {
        self.content_object()
            .and_then(|content| content.get(key))
            .is_some_and(is_truthy)
    }

    /// `content.<key>` when it is a JSON boolean.
    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.content_object()
            .and_then(|content| content.get(key))
            .and_then(Value::as_bool)
    }
}

/// Reads `content.id` as a document id.
pub(crate) fn content_id(content: &Payload) -> RepoResult<DocumentId> {
    match content.get("id") {
        Some(Value::String(text)) => parse_document_id(text),
        Some(other) => Err(RepoError::InvalidId(other.to_string())),
        None => Err(RepoError::InvalidId(String::new())),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
