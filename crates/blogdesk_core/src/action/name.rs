//! Action names and their payload requirements.

use super::envelope::ActionRequest;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The eight gateway operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionName {
    CreateBlog,
    DeleteBlog,
    SavePost,
    DeletePost,
    PublishPost,
    AllowComments,
    SaveComment,
    DeleteComment,
}

impl ActionName {
    pub const ALL: [ActionName; 8] = [
        Self::CreateBlog,
        Self::DeleteBlog,
        Self::SavePost,
        Self::DeletePost,
        Self::PublishPost,
        Self::AllowComments,
        Self::SaveComment,
        Self::DeleteComment,
    ];

    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateBlog => "createBlog",
            Self::DeleteBlog => "deleteBlog",
            Self::SavePost => "savePost",
            Self::DeletePost => "deletePost",
            Self::PublishPost => "publishPost",
            Self::AllowComments => "allowComments",
            Self::SaveComment => "saveComment",
            Self::DeleteComment => "deleteComment",
        }
    }

    /// Rejection reason used when the payload lacks required fields.
    pub fn validation_message(self) -> &'static str {
        match self {
            Self::CreateBlog => "You didn't title your new blog",
            Self::DeleteBlog => "You didn't specify which blog you want to turf",
            Self::SavePost => "Where's the post? You're missing something",
            Self::DeletePost => "Which post do you want to delete?",
            Self::PublishPost => "Which post do you want to publish?",
            Self::AllowComments => "On which post do you want to modify commenting?",
            Self::SaveComment => "Upon what are you commenting? You're missing something",
            Self::DeleteComment => "Which comment do you want to delete?",
        }
    }

    /// Whether `request` carries every field this action requires.
    pub fn accepts(self, request: &ActionRequest) -> bool {
        match self {
            Self::CreateBlog => request.has_field("title"),
            Self::DeleteBlog | Self::DeletePost | Self::DeleteComment => request.has_field("id"),
            Self::SavePost | Self::SaveComment => request.has_content(),
            Self::PublishPost => {
                request.has_field("id") && request.bool_field("published").is_some()
            }
            Self::AllowComments => request.has_field("id") && request.bool_field("allow").is_some(),
        }
    }
}

impl Display for ActionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActionError(pub String);

impl Display for UnknownActionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown action: `{}`", self.0)
    }
}

impl Error for UnknownActionError {}

/// Parses a wire action name such as `publishPost`.
///
/// Surrounding whitespace is ignored; the name itself is case-sensitive.
pub fn parse_action_name(value: &str) -> Result<ActionName, UnknownActionError> {
    let normalized = value.trim();
    ActionName::ALL
        .into_iter()
        .find(|name| name.as_str() == normalized)
        .ok_or_else(|| UnknownActionError(normalized.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_action_name, ActionName, UnknownActionError};
    use crate::action::ActionRequest;
    use serde_json::json;

    #[test]
    fn every_action_name_round_trips() {
        for name in ActionName::ALL {
            assert_eq!(parse_action_name(name.as_str()).unwrap(), name);
        }
    }

    #[test]
    fn rejects_unknown_or_miscased_names() {
        assert_eq!(
            parse_action_name("PublishPost"),
            Err(UnknownActionError("PublishPost".to_string()))
        );
        assert!(parse_action_name("disallowComments").is_err());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse_action_name("  savePost\n").unwrap(), ActionName::SavePost);
    }

    #[test]
    fn validation_messages_are_distinct() {
        let mut messages: Vec<_> = ActionName::ALL
            .iter()
            .map(|name| name.validation_message())
            .collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), ActionName::ALL.len());
    }

    #[test]
    fn publish_requires_boolean_flag() {
        let id = "9a3f1c1e-4a5b-4c6d-8e9f-0a1b2c3d4e5f";
        assert!(ActionName::PublishPost.accepts(&ActionRequest::new(
            json!({ "id": id, "published": false })
        )));
        assert!(!ActionName::PublishPost.accepts(&ActionRequest::new(json!({ "id": id }))));
        assert!(!ActionName::PublishPost.accepts(&ActionRequest::new(
            json!({ "id": id, "published": "yes" })
        )));
        assert!(!ActionName::PublishPost.accepts(&ActionRequest::new(
            json!({ "published": true })
        )));
    }

    #[test]
    fn allow_comments_reads_allow_flag() {
        let id = "9a3f1c1e-4a5b-4c6d-8e9f-0a1b2c3d4e5f";
        assert!(ActionName::AllowComments.accepts(&ActionRequest::new(
            json!({ "id": id, "allow": false })
        )));
        assert!(!ActionName::AllowComments.accepts(&ActionRequest::new(
            json!({ "id": id, "published": true })
        )));
    }

    #[test]
    fn save_actions_need_non_empty_content() {
        assert!(!ActionName::SavePost.accepts(&ActionRequest::empty()));
        assert!(!ActionName::SavePost.accepts(&ActionRequest::new(json!({}))));
        assert!(ActionName::SaveComment.accepts(&ActionRequest::new(json!({ "body": "x" }))));
    }
}
