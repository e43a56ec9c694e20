//! Core of blogdesk: permission-gated blog, post and comment actions over a
//! SQLite-backed document store.

pub mod action;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use action::{
    parse_action_name, ActionError, ActionGateway, ActionName, ActionRequest, ActionResult,
    Caller, UnknownActionError, NOT_PERMITTED_MESSAGE,
};
pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::blog::{Blog, BlogFilter, BlogPatch};
pub use model::comment::{Comment, CommentFilter, CommentPatch};
pub use model::post::{Post, PostFilter, PostPatch};
pub use model::{DocumentId, ModelValidationError, Payload};
pub use repo::blog_repo::{BlogRepository, SqliteBlogRepository};
pub use repo::comment_repo::{CommentRepository, SqliteCommentRepository};
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::registry::{parse_model_name, ModelName, ModelRegistry, SqliteModelRegistry};
pub use repo::{parse_document_id, RepoError, RepoResult};

/// Minimal health-check API for probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
