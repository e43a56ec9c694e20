use blogdesk_core::db::migrations::latest_version;
use blogdesk_core::db::{open_db, open_db_in_memory, DbError, DEFAULT_BUSY_TIMEOUT};
use blogdesk_core::{Blog, BlogFilter, CoreConfig, ModelRegistry, RepoError, SqliteModelRegistry};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_all_collections() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in ["blogs", "posts", "comments"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blogdesk.db");

    let first = open_db(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
    assert_eq!(schema_version(&first), latest_version());
    drop(first);

    let second = open_db(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    assert_table_exists(&second, "posts");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path, DEFAULT_BUSY_TIMEOUT).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn registry_opens_configured_file_and_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig {
        db_path: dir.path().join("configured.db"),
        ..CoreConfig::default()
    };

    {
        let registry = SqliteModelRegistry::open(&config).unwrap();
        registry.blogs().insert(&Blog::new("Deep thoughts...")).unwrap();
    }

    let registry = SqliteModelRegistry::open(&config).unwrap();
    let blogs = registry.blogs().find_all(&BlogFilter::default()).unwrap();
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0].title, "Deep thoughts...");
}

#[test]
fn registry_surfaces_schema_errors_as_db_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let config = CoreConfig {
        db_path: path,
        ..CoreConfig::default()
    };
    let err = SqliteModelRegistry::open(&config).err().unwrap();
    assert!(matches!(
        err,
        RepoError::Db(DbError::UnsupportedSchemaVersion { .. })
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
