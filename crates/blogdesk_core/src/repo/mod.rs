//! Repository contracts and SQLite implementations for the three
//! collections, plus the model registry that owns the shared connection.
//!
//! # Responsibility
//! - Provide insert / find-and-delete / find-and-update / find-all per model.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Writes validate the document before touching SQL.
//! - Reads reject invalid persisted rows instead of masking them.
//! - Each call is atomic for the single document it touches.

use crate::db::DbError;
use crate::model::{DocumentId, ModelValidationError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub mod blog_repo;
pub mod comment_repo;
pub mod post_repo;
pub mod registry;

pub type RepoResult<T> = Result<T, RepoError>;

/// One SQLite connection shared by every repository of a registry.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Store-level failure surfaced to callers verbatim.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    /// Caller-supplied id is not a valid document id.
    InvalidId(String),
    /// A persisted row could not be decoded.
    InvalidData(String),
    UnknownModel(String),
    /// A previous holder of the connection lock panicked.
    ConnectionPoisoned,
}

impl RepoError {
    /// Content-free classification used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Db(DbError::UnsupportedSchemaVersion { .. }) => "unsupported_schema",
            Self::Db(_) => "db",
            Self::InvalidId(_) => "invalid_id",
            Self::InvalidData(_) => "invalid_data",
            Self::UnknownModel(_) => "unknown_model",
            Self::ConnectionPoisoned => "connection_poisoned",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidId(value) => write!(f, "invalid document id: `{value}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
            Self::UnknownModel(name) => write!(f, "unknown model: `{name}`"),
            Self::ConnectionPoisoned => write!(f, "store connection is poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Parses a caller-supplied id string.
pub fn parse_document_id(value: &str) -> RepoResult<DocumentId> {
    Uuid::parse_str(value.trim()).map_err(|_| RepoError::InvalidId(value.to_string()))
}

pub(crate) fn lock(conn: &SharedConnection) -> RepoResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| RepoError::ConnectionPoisoned)
}

pub(crate) fn parse_stored_id(column: &str, value: &str) -> RepoResult<DocumentId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid id `{value}` in {column}")))
}

pub(crate) fn parse_stored_bool(column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
