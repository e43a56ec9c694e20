//! Model registry: the single owner of the store connection.
//!
//! # Responsibility
//! - Hand out the blog, post and comment repositories over one shared
//!   connection.
//! - Register model handles by name, idempotently.
//!
//! # Invariants
//! - Registering an already-registered model is a no-op, never an error.
//! - A model is only registered once its collection exists in the schema.

use super::blog_repo::{BlogRepository, SqliteBlogRepository};
use super::comment_repo::{CommentRepository, SqliteCommentRepository};
use super::post_repo::{PostRepository, SqlitePostRepository};
use super::{lock, RepoError, RepoResult, SharedConnection};
use crate::config::CoreConfig;
use crate::db::{open_db, open_db_in_memory};
use log::info;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Named model handles known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelName {
    Blog,
    Post,
    Comment,
}

impl ModelName {
    pub const ALL: [ModelName; 3] = [Self::Blog, Self::Post, Self::Comment];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blog => "Blog",
            Self::Post => "Post",
            Self::Comment => "Comment",
        }
    }

    /// Backing table name.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Blog => "blogs",
            Self::Post => "posts",
            Self::Comment => "comments",
        }
    }
}

/// Parses a model name (`Blog|Post|Comment`).
pub fn parse_model_name(value: &str) -> RepoResult<ModelName> {
    let normalized = value.trim();
    ModelName::ALL
        .into_iter()
        .find(|name| name.as_str() == normalized)
        .ok_or_else(|| RepoError::UnknownModel(normalized.to_string()))
}

/// Store boundary consumed by the action gateway.
pub trait ModelRegistry: Send + Sync {
    fn blogs(&self) -> &dyn BlogRepository;
    fn posts(&self) -> &dyn PostRepository;
    fn comments(&self) -> &dyn CommentRepository;
}

/// SQLite-backed registry. All repositories share one connection.
pub struct SqliteModelRegistry {
    conn: SharedConnection,
    registered: Mutex<BTreeSet<ModelName>>,
    blogs: SqliteBlogRepository,
    posts: SqlitePostRepository,
    comments: SqliteCommentRepository,
}

impl SqliteModelRegistry {
    /// Wraps a migrated connection and registers every model.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        let conn: SharedConnection = Arc::new(Mutex::new(conn));
        let registry = Self {
            blogs: SqliteBlogRepository::new(Arc::clone(&conn)),
            posts: SqlitePostRepository::new(Arc::clone(&conn)),
            comments: SqliteCommentRepository::new(Arc::clone(&conn)),
            registered: Mutex::new(BTreeSet::new()),
            conn,
        };
        for name in ModelName::ALL {
            registry.ensure_model(name)?;
        }
        Ok(registry)
    }

    /// Opens the database file named by `config`.
    pub fn open(config: &CoreConfig) -> RepoResult<Self> {
        let conn = open_db(&config.db_path, config.busy_timeout)?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory store, mostly for tests and probes.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Gets or creates the handle registration for `name`.
    pub fn ensure_model(&self, name: ModelName) -> RepoResult<()> {
        let mut registered = self
            .registered
            .lock()
            .map_err(|_| RepoError::ConnectionPoisoned)?;
        if registered.contains(&name) {
            return Ok(());
        }

        {
            let conn = lock(&self.conn)?;
            ensure_collection_exists(&conn, name.collection())?;
        }
        registered.insert(name);
        info!(
            "event=model_register module=repo status=ok model={} collection={}",
            name.as_str(),
            name.collection()
        );
        Ok(())
    }

    /// Registered model names in stable order.
    pub fn registered_models(&self) -> RepoResult<Vec<ModelName>> {
        let registered = self
            .registered
            .lock()
            .map_err(|_| RepoError::ConnectionPoisoned)?;
        Ok(registered.iter().copied().collect())
    }
}

impl ModelRegistry for SqliteModelRegistry {
    fn blogs(&self) -> &dyn BlogRepository {
        &self.blogs
    }

    fn posts(&self) -> &dyn PostRepository {
        &self.posts
    }

    fn comments(&self) -> &dyn CommentRepository {
        &self.comments
    }
}

fn ensure_collection_exists(conn: &Connection, collection: &str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [collection],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::InvalidData(format!(
            "collection `{collection}` is missing; schema migrations were not applied"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_model_name, ModelName, SqliteModelRegistry};
    use crate::repo::RepoError;
    use rusqlite::Connection;

    #[test]
    fn parses_known_model_names() {
        assert_eq!(parse_model_name("Blog").unwrap(), ModelName::Blog);
        assert_eq!(parse_model_name(" Post ").unwrap(), ModelName::Post);
        assert_eq!(parse_model_name("Comment").unwrap(), ModelName::Comment);
    }

    #[test]
    fn rejects_unknown_or_lowercase_model_names() {
        assert!(matches!(
            parse_model_name("blog"),
            Err(RepoError::UnknownModel(name)) if name == "blog"
        ));
        assert!(parse_model_name("Author").is_err());
    }

    #[test]
    fn ensure_model_is_idempotent() {
        let registry = SqliteModelRegistry::open_in_memory().unwrap();
        registry.ensure_model(ModelName::Post).unwrap();
        registry.ensure_model(ModelName::Post).unwrap();

        assert_eq!(
            registry.registered_models().unwrap(),
            vec![ModelName::Blog, ModelName::Post, ModelName::Comment]
        );
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteModelRegistry::from_connection(conn)
            .err()
            .expect("missing collections must be rejected");
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}
