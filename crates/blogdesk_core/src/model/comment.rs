//! Comment document.

use super::{now_epoch_ms, read_draft, require_text, DocumentId, ModelValidationError, Payload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MODEL: &str = "Comment";

/// A reader comment attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: DocumentId,
    /// Commented post. Not checked against the `posts` collection.
    pub post_id: Option<DocumentId>,
    pub byline: String,
    pub body: String,
    /// Unix epoch milliseconds.
    pub date: i64,
}

/// Partial update applied by `find_and_update_by_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPatch {
    pub body: Option<String>,
}

/// Equality filter for `find_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentFilter {
    pub post_id: Option<DocumentId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentDraft {
    #[serde(default)]
    post_id: Option<DocumentId>,
    #[serde(default)]
    byline: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    date: Option<i64>,
}

impl Comment {
    pub fn new(byline: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id: None,
            byline: byline.into(),
            body: body.into(),
            date: now_epoch_ms(),
        }
    }

    pub fn from_payload(payload: &Payload) -> Result<Self, ModelValidationError> {
        let draft: CommentDraft = read_draft(MODEL, payload)?;
        let mut comment = Self::new(
            draft.byline.unwrap_or_default(),
            draft.body.unwrap_or_default(),
        );
        comment.post_id = draft.post_id;
        if let Some(date) = draft.date {
            comment.date = date;
        }

        comment.validate()?;
        Ok(comment)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text(MODEL, "byline", &self.byline)?;
        require_text(MODEL, "body", &self.body)
    }
}

impl CommentPatch {
    pub fn apply_to(&self, comment: &mut Comment) {
        if let Some(body) = &self.body {
            comment.body = body.clone();
        }
    }
}
