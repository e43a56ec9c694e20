//! Document model for the blog store.
//!
//! # Responsibility
//! - Define the three persisted collections: blogs, posts and comments.
//! - Turn loose request payloads into validated documents.
//!
//! # Invariants
//! - Every document is identified by a stable `DocumentId` assigned at insert.
//! - References between collections (`blog_id`, `post_id`) are plain ids;
//!   nothing here checks that the target exists.

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod blog;
pub mod comment;
pub mod post;

/// Stable identifier shared by all three collections.
pub type DocumentId = Uuid;

/// Loose JSON object a document is built from.
pub type Payload = Map<String, Value>;

/// Store-level document validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required field is absent or empty.
    MissingField {
        model: &'static str,
        field: &'static str,
    },
    /// The payload could not be read as this model (wrong field types, bad id).
    Malformed { model: &'static str, message: String },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { model, field } => {
                write!(f, "{model} validation failed: `{field}` is required")
            }
            Self::Malformed { model, message } => {
                write!(f, "{model} validation failed: {message}")
            }
        }
    }
}

impl Error for ModelValidationError {}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

pub(crate) fn require_text(
    model: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if value.is_empty() {
        return Err(ModelValidationError::MissingField { model, field });
    }
    Ok(())
}

/// Reads a payload object as a draft type, ignoring unknown keys.
pub(crate) fn read_draft<T: serde::de::DeserializeOwned>(
    model: &'static str,
    payload: &Payload,
) -> Result<T, ModelValidationError> {
    serde_json::from_value(Value::Object(payload.clone())).map_err(|err| {
        ModelValidationError::Malformed {
            model,
            message: err.to_string(),
        }
    })
}
