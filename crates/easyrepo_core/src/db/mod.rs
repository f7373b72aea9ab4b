//! Database collaborator contracts and SQLite bootstrap.
//!
//! # Responsibility
//! - Define the narrow query/prepare/bind/execute/fetch surface the
//!   repository delegates to.
//! - Open and configure SQLite connections, and apply caller-supplied schema
//!   migrations.
//!
//! # Invariants
//! - Database failures surface unmodified as `DbError`; no retry happens here.
//! - Migration version is tracked via `PRAGMA user_version`.

use crate::model::row::Row;
use crate::model::value::{ParamType, Value};
use crate::repo::bindings::ParamKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod sqlite;

pub use open::{open_db, open_db_in_memory, open_db_with_config};
pub use sqlite::SqliteStatement;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Placeholder name or position not present in the prepared statement.
    UnknownParameter(String),
    BindTypeMismatch {
        key: String,
        tag: ParamType,
        found: &'static str,
    },
    /// Text cell that is not valid UTF-8.
    InvalidText {
        column: String,
        source: std::str::Utf8Error,
    },
    Config(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UnknownParameter(key) => write!(f, "unknown statement parameter `{key}`"),
            Self::BindTypeMismatch { key, tag, found } => write!(
                f,
                "cannot bind {found} value to `{key}` as {}",
                tag.as_str()
            ),
            Self::InvalidText { column, source } => {
                write!(f, "column `{column}` holds invalid UTF-8 text: {source}")
            }
            Self::Config(message) => write!(f, "invalid database configuration: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidText { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. }
            | Self::UnknownParameter(_)
            | Self::BindTypeMismatch { .. }
            | Self::Config(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Connection-level operations used by the repository.
pub trait Database {
    /// Runs `sql` without parameters and fetches every resulting row.
    fn query_all(&self, sql: &str) -> DbResult<Vec<Row>>;

    /// Prepares a parameterized statement.
    fn prepare_statement<'a>(&'a self, sql: &str) -> DbResult<Box<dyn Statement + 'a>>;
}

/// One prepared statement: bind, execute, then fetch.
pub trait Statement {
    fn bind_value(&mut self, key: &ParamKey, value: &Value, kind: ParamType) -> DbResult<()>;

    /// Executes with the currently bound values.
    fn execute(&mut self) -> DbResult<bool>;

    /// Rows affected (DML) or returned (queries) by the last `execute`.
    fn row_count(&self) -> usize;

    /// Takes the rows produced by the last `execute`.
    fn fetch_all(&mut self) -> DbResult<Vec<Row>>;
}
