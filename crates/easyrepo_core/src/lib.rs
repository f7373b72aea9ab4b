//! Generic model repository over SQLite.
//! Loads rows into typed models, keeps them in order behind a cursor, and
//! forwards prepared statements to the database.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig};
pub use db::migrations::Migration;
pub use db::{Database, DbError, DbResult, Statement};
pub use logging::{default_log_level, init_logging, init_logging_with_config, logging_status};
pub use model::registry::{ModelFactory, ModelRegistry, ModelRegistryError};
pub use model::row::{Row, RowError};
pub use model::value::{ParamType, Value};
pub use model::{FromRow, Model};
pub use repo::bindings::{Bindings, ParamKey};
pub use repo::cursor::Cursor;
pub use repo::repository::Repository;
pub use repo::{RepoError, RepoResult};

/// Minimal health-check API.
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
