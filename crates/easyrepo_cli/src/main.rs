//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `easyrepo_core` linkage end to end against a scratch database.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `easyrepo_cli [config.json]`

use easyrepo_core::db::open_db_with_config;
use easyrepo_core::{
    init_logging_with_config, Bindings, CoreConfig, Migration, ModelRegistry, Repository, Row,
};
use std::process::ExitCode;
use std::sync::Arc;

const DEMO_SCHEMA: &[Migration] = &[Migration::new(
    1,
    "CREATE TABLE IF NOT EXISTS demo_items (
        id INTEGER PRIMARY KEY,
        label TEXT NOT NULL
    );",
)];

fn main() -> ExitCode {
    println!("easyrepo_core ping={}", easyrepo_core::ping());
    println!("easyrepo_core version={}", easyrepo_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::from_json_file(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    init_logging_with_config(&config.logging)?;

    let conn = open_db_with_config(&config.database, DEMO_SCHEMA).map_err(|err| err.to_string())?;

    let mut registry = ModelRegistry::<Row>::new();
    registry
        .register_from_row("Item")
        .map_err(|err| err.to_string())?;
    let mut repo = Repository::with_database(&conn).with_registry(Arc::new(registry));

    let inserted = repo
        .get_rows_by_query(
            "INSERT OR IGNORE INTO demo_items (id, label) VALUES (?1, ?2), (?3, ?4)",
            &Bindings::new()
                .bind(1_usize, 1)
                .bind(2_usize, "first")
                .bind(3_usize, 2)
                .bind(4_usize, "second"),
        )
        .map_err(|err| err.to_string())?;
    println!("easyrepo_core inserted={inserted}");

    let loaded = repo
        .load_all_from_table("Item", "demo_items")
        .map_err(|err| err.to_string())?;
    println!("easyrepo_core loaded={loaded}");

    let rows = serde_json::to_string(repo.get_all()).map_err(|err| err.to_string())?;
    println!("easyrepo_core rows={rows}");
    Ok(())
}
