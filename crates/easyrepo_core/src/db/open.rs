//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas from `DatabaseConfig`.
//! - Apply the caller's schema migrations before returning a connection.
//!
//! # Invariants
//! - Returned connections have the supplied migrations fully applied.

use super::migrations::{apply_migrations, Migration};
use super::DbResult;
use crate::config::DatabaseConfig;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file with default settings and applies
/// `migrations`.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>, migrations: &[Migration]) -> DbResult<Connection> {
    let config = DatabaseConfig {
        path: Some(path.as_ref().to_path_buf()),
        ..DatabaseConfig::default()
    };
    open_db_with_config(&config, migrations)
}

/// Opens an in-memory SQLite database with default settings and applies
/// `migrations`.
pub fn open_db_in_memory(migrations: &[Migration]) -> DbResult<Connection> {
    open_db_with_config(&DatabaseConfig::default(), migrations)
}

/// Opens the database described by `config`.
///
/// `config.path == None` selects an in-memory database.
pub fn open_db_with_config(
    config: &DatabaseConfig,
    migrations: &[Migration],
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = if config.path.is_some() { "file" } else { "memory" };
    info!("event=db_open module=db status=start mode={mode}");

    let opened = match &config.path {
        Some(path) => Connection::open(path),
        None => Connection::open_in_memory(),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, config, migrations) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={} migrations={}",
                started_at.elapsed().as_millis(),
                migrations.len()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(
    conn: &mut Connection,
    config: &DatabaseConfig,
    migrations: &[Migration],
) -> DbResult<()> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    apply_migrations(conn, migrations)?;
    Ok(())
}
