//! Ordered schema migrations for the `blogs`, `posts` and `comments`
//! collections.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - All pending migrations apply in one transaction.

use crate::db::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_collections.sql"),
}];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the schema up to `latest_version()`, refusing newer databases.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();

    match current.cmp(&latest) {
        Ordering::Greater => Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        }),
        Ordering::Equal => Ok(()),
        Ordering::Less => {
            let tx = conn.transaction()?;
            for migration in pending(current) {
                tx.execute_batch(migration.sql)?;
                tx.pragma_update(None, "user_version", migration.version)?;
            }
            tx.commit()?;
            debug!("event=db_migrate module=db status=ok from={current} to={latest}");
            Ok(())
        }
    }
}

/// Migrations newer than `current`, oldest first.
fn pending(current: u32) -> &'static [Migration] {
    let applied = MIGRATIONS.partition_point(|migration| migration.version <= current);
    &MIGRATIONS[applied..]
}
