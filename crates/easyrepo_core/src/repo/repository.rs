//! Generic in-memory model repository.
//!
//! # Responsibility
//! - Keep an ordered, append-only collection of models with a cursor.
//! - Find models by integer id (strict) or by any field (loose text match).
//! - Populate the collection from table scans or prepared queries.
//!
//! # Invariants
//! - Items keep insertion order; duplicates are allowed.
//! - `clear()` never moves the cursor; reads past either end yield `None`.
//! - Bulk loads append; rows decoded before a failing row stay loaded.
//! - Not synchronized: callers serialize access themselves.

use crate::db::{Database, Statement};
use crate::model::registry::{ModelFactory, ModelRegistry};
use crate::model::row::Row;
use crate::model::value::{ParamType, Value};
use crate::model::Model;
use crate::repo::bindings::Bindings;
use crate::repo::cursor::Cursor;
use crate::repo::{RepoError, RepoResult};
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Instant;

static TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("valid table name regex")
});

/// Ordered model collection with cursor and database pass-through.
///
/// ## Usage
/// ```rust,ignore
/// let mut registry = ModelRegistry::new();
/// registry.register_from_row("User")?;
///
/// let mut users = Repository::with_database(&conn).with_registry(Arc::new(registry));
/// users.load_all_from_table("User", "users")?;
///
/// while let Some(user) = users.current() {
///     println!("{user:?}");
///     users.next();
/// }
/// ```
pub struct Repository<'db, M> {
    items: Vec<M>,
    cursor: Cursor,
    db: Option<&'db dyn Database>,
    registry: Arc<ModelRegistry<M>>,
    rows: usize,
}

impl<M> Default for Repository<'_, M> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: Cursor::new(),
            db: None,
            registry: Arc::new(ModelRegistry::new()),
            rows: 0,
        }
    }
}

impl<M: Debug> Debug for Repository<'_, M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("items", &self.items)
            .field("cursor", &self.cursor.position())
            .field("has_database", &self.db.is_some())
            .field("registry", &self.registry)
            .field("rows", &self.rows)
            .finish()
    }
}

impl<'db, M: Model> Repository<'db, M> {
    /// Empty repository without a database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty repository that delegates queries to `db`.
    pub fn with_database(db: &'db dyn Database) -> Self {
        Self::from_parts(Some(db), None)
    }

    /// Repository optionally bound to `db` and optionally seeded with one item.
    pub fn from_parts(db: Option<&'db dyn Database>, initial: Option<M>) -> Self {
        Self {
            items: initial.into_iter().collect(),
            db,
            ..Self::default()
        }
    }

    /// Replaces the factory registry used by bulk loads.
    pub fn with_registry(mut self, registry: Arc<ModelRegistry<M>>) -> Self {
        self.registry = registry;
        self
    }

    pub fn has_database(&self) -> bool {
        self.db.is_some()
    }

    pub fn registry(&self) -> &ModelRegistry<M> {
        &self.registry
    }

    pub fn add(&mut self, item: M) {
        self.items.push(item);
    }

    pub fn get_all(&self) -> &[M] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<M> {
        self.items
    }

    /// Drops every item. The cursor keeps its position.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the first item whose integer id equals `id`.
    ///
    /// Comparison is strict: an id stored as text `"7"` does not match `7`.
    ///
    /// # Errors
    /// - `RepoError::NotFound(id)` when no item matches.
    pub fn get_by_index(&self, id: i64) -> RepoResult<&M> {
        self.items
            .iter()
            .find(|item| item.id() == Some(id))
            .ok_or(RepoError::NotFound(id))
    }

    /// Returns every item whose `field` loosely equals `search`, in order.
    ///
    /// Items without `field` never match.
    pub fn get_by(&self, field: &str, search: &str) -> Vec<&M> {
        self.items
            .iter()
            .filter(|item| {
                item.field(field)
                    .is_some_and(|value| value.loosely_equals(search))
            })
            .collect()
    }

    pub fn has_next(&self) -> bool {
        self.cursor.peek(&self.items, 1).is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.cursor.peek(&self.items, -1).is_some()
    }

    /// Item under the cursor, or `None` when the cursor is out of range.
    pub fn current(&self) -> Option<&M> {
        self.cursor.current(&self.items)
    }

    /// Moves forward one step, unchecked, and returns the new current item.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&M> {
        self.cursor.advance();
        self.current()
    }

    /// Moves back one step, unchecked, and returns the new current item.
    pub fn previous(&mut self) -> Option<&M> {
        self.cursor.retreat();
        self.current()
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Raw cursor position; may be negative or past the end.
    pub fn position(&self) -> isize {
        self.cursor.position()
    }

    /// Loads every row of `table` as `model_name` instances.
    ///
    /// Returns the number of items appended.
    ///
    /// # Errors
    /// - `InvalidTableName` unless `table` is `name` or `schema.name`.
    /// - `Registry(ModelNotFound)` for an unregistered model, before any SQL.
    /// - `NoDatabase`, `Db`, or decoder errors from the model factory.
    pub fn load_all_from_table(&mut self, model_name: &str, table: &str) -> RepoResult<usize> {
        let started_at = Instant::now();
        let result = self.load_table_rows(model_name, table);
        match &result {
            Ok(count) => info!(
                "event=repo_load module=repo status=ok source=table table={} model={} count={} duration_ms={}",
                table,
                model_name,
                count,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_load module=repo status=error source=table table={} model={} duration_ms={} error={}",
                table,
                model_name,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Runs a prepared query with `bindings` and appends each result row as a
    /// `model_name` instance.
    ///
    /// Returns the number of items appended.
    pub fn load_all_from_table_by_query(
        &mut self,
        model_name: &str,
        sql: &str,
        bindings: &Bindings,
    ) -> RepoResult<usize> {
        let started_at = Instant::now();
        let result = self.load_query_rows(model_name, sql, bindings);
        match &result {
            Ok(count) => info!(
                "event=repo_load module=repo status=ok source=query model={} bindings={} count={} duration_ms={}",
                model_name,
                bindings.len(),
                count,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_load module=repo status=error source=query model={} bindings={} duration_ms={} error={}",
                model_name,
                bindings.len(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Executes a prepared statement without touching the items.
    ///
    /// The affected/returned row count is available from `get_rows()`.
    pub fn execute_query(&mut self, sql: &str, bindings: &Bindings) -> RepoResult<bool> {
        let db = self.require_db()?;
        let mut statement = prepare_bound(db, sql, bindings)?;
        let status = statement.execute()?;
        self.rows = statement.row_count();
        debug!(
            "event=repo_execute module=repo status=ok bindings={} rows={}",
            bindings.len(),
            self.rows
        );
        Ok(status)
    }

    /// Row count recorded by the last load or statement.
    pub fn get_rows(&self) -> usize {
        self.rows
    }

    /// Executes `sql` and returns its affected/returned row count.
    pub fn get_rows_by_query(&mut self, sql: &str, bindings: &Bindings) -> RepoResult<usize> {
        self.execute_query(sql, bindings)?;
        Ok(self.get_rows())
    }

    /// Bind type tag for `value`.
    pub fn param_type(value: &Value) -> RepoResult<ParamType> {
        ParamType::classify(value)
    }

    fn load_table_rows(&mut self, model_name: &str, table: &str) -> RepoResult<usize> {
        let sql = select_all_sql(table)?;
        let factory = self.registry.require(model_name)?;
        let db = self.require_db()?;

        let rows = db.query_all(&sql)?;
        self.rows = rows.len();
        self.append_rows(factory, &rows)
    }

    fn load_query_rows(
        &mut self,
        model_name: &str,
        sql: &str,
        bindings: &Bindings,
    ) -> RepoResult<usize> {
        let factory = self.registry.require(model_name)?;
        let db = self.require_db()?;

        let mut statement = prepare_bound(db, sql, bindings)?;
        statement.execute()?;
        self.rows = statement.row_count();
        let rows = statement.fetch_all()?;
        self.append_rows(factory, &rows)
    }

    fn append_rows(&mut self, factory: ModelFactory<M>, rows: &[Row]) -> RepoResult<usize> {
        for (appended, row) in rows.iter().enumerate() {
            match factory(row) {
                Ok(item) => self.items.push(item),
                Err(err) => {
                    debug!(
                        "event=repo_decode module=repo status=error appended={} error={}",
                        appended, err
                    );
                    return Err(err);
                }
            }
        }
        Ok(rows.len())
    }

    fn require_db(&self) -> RepoResult<&'db dyn Database> {
        self.db.ok_or(RepoError::NoDatabase)
    }
}

impl<'a, M> IntoIterator for &'a Repository<'_, M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn prepare_bound<'db>(
    db: &'db dyn Database,
    sql: &str,
    bindings: &Bindings,
) -> RepoResult<Box<dyn Statement + 'db>> {
    let mut statement = db.prepare_statement(sql)?;
    for (key, value) in bindings.iter() {
        let kind = ParamType::classify(value)?;
        statement.bind_value(key, value, kind)?;
    }
    Ok(statement)
}

fn select_all_sql(table: &str) -> RepoResult<String> {
    let table = table.trim();
    if !TABLE_NAME_RE.is_match(table) {
        return Err(RepoError::InvalidTableName(table.to_string()));
    }
    let quoted = table
        .split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join(".");
    Ok(format!("SELECT * FROM {quoted}"))
}
