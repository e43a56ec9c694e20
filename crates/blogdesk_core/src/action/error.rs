//! Action rejection reasons.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reason given to callers lacking both `admin` and `write`.
pub const NOT_PERMITTED_MESSAGE: &str = "You are not permitted to request or propose that action";

pub type ActionResult<T> = Result<T, ActionError>;

/// Why an action was rejected.
#[derive(Debug)]
pub enum ActionError {
    /// Caller has neither `admin` nor `write`.
    NotPermitted,
    /// Required content is missing; carries the action's fixed message.
    ValidationFailed(&'static str),
    /// The store call failed; the store error is kept as-is.
    Store(RepoError),
    /// The outcome could not be rendered as JSON.
    Encoding(serde_json::Error),
}

impl ActionError {
    /// Human-readable rejection reason.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl Display for ActionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPermitted => f.write_str(NOT_PERMITTED_MESSAGE),
            Self::ValidationFailed(message) => f.write_str(message),
            Self::Store(err) => write!(f, "{err}"),
            Self::Encoding(err) => write!(f, "failed to encode action outcome: {err}"),
        }
    }
}

impl Error for ActionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encoding(err) => Some(err),
            Self::NotPermitted | Self::ValidationFailed(_) => None,
        }
    }
}

impl From<RepoError> for ActionError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}
