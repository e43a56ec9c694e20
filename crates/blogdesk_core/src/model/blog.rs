//! Blog document.

use super::{read_draft, require_text, DocumentId, ModelValidationError, Payload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MODEL: &str = "Blog";

/// A named container for posts. Titles are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: DocumentId,
    pub title: String,
}

/// Partial update applied by `find_and_update_by_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogPatch {
    pub title: Option<String>,
}

/// Equality filter for `find_all`; `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilter {
    pub title: Option<String>,
}

#[derive(Deserialize)]
struct BlogDraft {
    #[serde(default)]
    title: Option<String>,
}

impl Blog {
    /// Creates a blog with a freshly generated id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
        }
    }

    /// Builds a blog from a payload object; unknown keys are dropped.
    pub fn from_payload(payload: &Payload) -> Result<Self, ModelValidationError> {
        let draft: BlogDraft = read_draft(MODEL, payload)?;
        let blog = Self::new(draft.title.unwrap_or_default());
        blog.validate()?;
        Ok(blog)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text(MODEL, "title", &self.title)
    }
}

impl BlogPatch {
    pub fn apply_to(&self, blog: &mut Blog) {
        if let Some(title) = &self.title {
            blog.title = title.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Blog, BlogPatch};
    use crate::model::ModelValidationError;
    use serde_json::json;

    #[test]
    fn from_payload_ignores_unknown_keys() {
        let payload = json!({ "title": "Deep thoughts...", "owner": "ralph" });
        let blog = Blog::from_payload(payload.as_object().unwrap()).unwrap();
        assert_eq!(blog.title, "Deep thoughts...");
    }

    #[test]
    fn from_payload_requires_title() {
        let payload = json!({});
        let err = Blog::from_payload(payload.as_object().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            ModelValidationError::MissingField { field: "title", .. }
        ));
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut blog = Blog::new("before");
        let id = blog.id;
        BlogPatch::default().apply_to(&mut blog);
        assert_eq!(blog.title, "before");

        BlogPatch {
            title: Some("after".to_string()),
        }
        .apply_to(&mut blog);
        assert_eq!(blog.title, "after");
        assert_eq!(blog.id, id);
    }
}
