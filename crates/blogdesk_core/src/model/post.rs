//! Post document.
//!
//! # Invariants
//! - `headline` and `byline` are non-empty.
//! - `published` and `comments_allowed` start `false` unless the payload says
//!   otherwise.
//! - `date` defaults to creation time in epoch milliseconds.

use super::{now_epoch_ms, read_draft, require_text, DocumentId, ModelValidationError, Payload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MODEL: &str = "Post";

/// One article inside a blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: DocumentId,
    /// Owning blog. Not checked against the `blogs` collection.
    pub blog_id: Option<DocumentId>,
    pub headline: String,
    pub byline: String,
    pub lead: Option<String>,
    pub body: Option<String>,
    /// Unix epoch milliseconds.
    pub date: i64,
    pub published: bool,
    pub comments_allowed: bool,
}

/// Partial update applied by `find_and_update_by_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub published: Option<bool>,
    pub comments_allowed: Option<bool>,
}

/// Equality filter for `find_all`; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub blog_id: Option<DocumentId>,
    pub published: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostDraft {
    #[serde(default)]
    blog_id: Option<DocumentId>,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    byline: Option<String>,
    #[serde(default)]
    lead: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    date: Option<i64>,
    #[serde(default)]
    published: Option<bool>,
    #[serde(default)]
    comments_allowed: Option<bool>,
}

impl Post {
    /// Creates an unpublished post, closed to comments, dated now.
    pub fn new(headline: impl Into<String>, byline: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            blog_id: None,
            headline: headline.into(),
            byline: byline.into(),
            lead: None,
            body: None,
            date: now_epoch_ms(),
            published: false,
            comments_allowed: false,
        }
    }

    /// Builds a post from a payload object, filling defaults for absent
    /// fields. A payload `id` is ignored; inserts always get a new id.
    pub fn from_payload(payload: &Payload) -> Result<Self, ModelValidationError> {
        let draft: PostDraft = read_draft(MODEL, payload)?;
        let mut post = Self::new(
            draft.headline.unwrap_or_default(),
            draft.byline.unwrap_or_default(),
        );
        post.blog_id = draft.blog_id;
        post.lead = draft.lead;
        post.body = draft.body;
        if let Some(date) = draft.date {
            post.date = date;
        }
        post.published = draft.published.unwrap_or(false);
        post.comments_allowed = draft.comments_allowed.unwrap_or(false);

        post.validate()?;
        Ok(post)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text(MODEL, "headline", &self.headline)?;
        require_text(MODEL, "byline", &self.byline)
    }
}

impl PostPatch {
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(published) = self.published {
            post.published = published;
        }
        if let Some(allowed) = self.comments_allowed {
            post.comments_allowed = allowed;
        }
    }
}
