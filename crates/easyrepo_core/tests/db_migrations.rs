use easyrepo_core::db::migrations::{apply_migrations, current_user_version, latest_version};
use easyrepo_core::db::{open_db, open_db_in_memory, open_db_with_config, DbError};
use easyrepo_core::{CoreConfig, Migration};
use rusqlite::Connection;

const MIGRATIONS: &[Migration] = &[
    Migration::new(1, "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);"),
    Migration::new(
        2,
        "CREATE TABLE posts (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id)
        );",
    ),
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory(MIGRATIONS).unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version(MIGRATIONS));
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "posts");
}

#[test]
fn open_db_without_migrations_leaves_schema_empty() {
    let conn = open_db_in_memory(&[]).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), 0);
}

#[test]
fn opening_same_database_twice_only_applies_new_steps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");

    let conn_first = open_db(&path, &MIGRATIONS[..1]).unwrap();
    assert_eq!(current_user_version(&conn_first).unwrap(), 1);
    drop(conn_first);

    let conn_second = open_db(&path, MIGRATIONS).unwrap();
    assert_eq!(current_user_version(&conn_second).unwrap(), 2);
    assert_table_exists(&conn_second, "posts");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path, MIGRATIONS).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_monotonic_migrations_are_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    let unordered = [Migration::new(2, "SELECT 1;"), Migration::new(1, "SELECT 1;")];

    let err = apply_migrations(&mut conn, &unordered).unwrap_err();
    assert!(matches!(err, DbError::Config(message) if message.contains("greater")));
}

#[test]
fn failed_migration_rolls_back_every_step() {
    let mut conn = Connection::open_in_memory().unwrap();
    let broken = [
        Migration::new(1, "CREATE TABLE users (id INTEGER PRIMARY KEY);"),
        Migration::new(2, "CREATE TABLE broken ("),
    ];

    assert!(apply_migrations(&mut conn, &broken).is_err());
    assert_eq!(current_user_version(&conn).unwrap(), 0);
}

#[test]
fn config_controls_foreign_keys_and_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let json = format!(
        r#"{{ "database": {{ "path": {}, "foreign_keys": false, "busy_timeout_ms": 100 }} }}"#,
        serde_json::to_string(path.to_str().unwrap()).unwrap()
    );
    let config = CoreConfig::from_json_str(&json).unwrap();

    let conn = open_db_with_config(&config.database, MIGRATIONS).unwrap();
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 0);
    assert!(path.exists());

    let defaults = open_db_in_memory(MIGRATIONS).unwrap();
    let foreign_keys: i64 = defaults
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
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
