//! In-memory model repository and its error contract.
//!
//! # Responsibility
//! - Hold loaded models in insertion order behind a bidirectional cursor.
//! - Forward bulk loads and statements to the database collaborator.
//!
//! # Invariants
//! - The only error raised locally for lookups is `NotFound`.
//! - Database errors are wrapped once in `RepoError::Db` and never retried.

use crate::db::DbError;
use crate::model::registry::ModelRegistryError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bindings;
pub mod cursor;
pub mod repository;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    /// No item carries the requested integer id.
    NotFound(i64),
    Db(DbError),
    Registry(ModelRegistryError),
    /// Bind value variant has no matching bind type tag.
    UnsupportedParameterType {
        type_name: &'static str,
    },
    /// A database operation was requested on a repository without one.
    NoDatabase,
    InvalidTableName(String),
    /// A fetched row could not be decoded into a model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "no repository item with id {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::UnsupportedParameterType { type_name } => {
                write!(f, "unsupported bind parameter type: {type_name}")
            }
            Self::NoDatabase => write!(f, "repository has no database connection"),
            Self::InvalidTableName(name) => write!(f, "invalid table name `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid row data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::NotFound(_)
            | Self::UnsupportedParameterType { .. }
            | Self::NoDatabase
            | Self::InvalidTableName(_)
            | Self::InvalidData(_) => None,
        }
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

impl From<ModelRegistryError> for RepoError {
    fn from(value: ModelRegistryError) -> Self {
        Self::Registry(value)
    }
}
