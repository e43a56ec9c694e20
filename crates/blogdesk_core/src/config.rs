//! Runtime configuration for the store and logging.
//!
//! # Responsibility
//! - Resolve the database location, lock wait and log settings from the
//!   process environment, falling back to local defaults.
//!
//! # Invariants
//! - Unset variables never fail; malformed values always do.

use crate::db::DEFAULT_BUSY_TIMEOUT;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "BLOGDESK_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "BLOGDESK_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "BLOGDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BLOGDESK_LOG_DIR";

/// Database file used when `BLOGDESK_DB_PATH` is unset.
pub const DEFAULT_DB_FILE_NAME: &str = "blogdesk.sqlite3";

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
    pub log_level: String,
    /// File logging is only enabled when a directory is configured.
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for {key}")
            }
        }
    }
}

impl Error for ConfigError {}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `BLOGDESK_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(raw) = read(ENV_BUSY_TIMEOUT_MS) {
            let millis = raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_BUSY_TIMEOUT_MS,
                    value: raw.clone(),
                })?;
            config.busy_timeout = Duration::from_millis(millis);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);

        Ok(config)
    }
}
