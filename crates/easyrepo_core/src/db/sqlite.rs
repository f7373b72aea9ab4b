//! rusqlite implementation of the database collaborator.
//!
//! # Invariants
//! - Result-producing statements are drained at `execute()`; `row_count()`
//!   is then the number of rows returned.
//! - DML statements report `changes()` as their row count.
//! - Booleans are stored as `0`/`1` integers.
//! - A bind tag must match the value's own variant; there is no coercion.
//! - Text cells that are not valid UTF-8 fail the read.

use crate::db::{Database, DbError, DbResult, Statement};
use crate::model::row::Row;
use crate::model::value::{ParamType, Value};
use crate::repo::bindings::ParamKey;
use log::debug;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::Connection;

impl Database for Connection {
    fn query_all(&self, sql: &str) -> DbResult<Vec<Row>> {
        let mut stmt = self.prepare(sql)?;
        let columns = column_names(&stmt);
        let mut rows = stmt.query([])?;
        let mut fetched = Vec::new();

        while let Some(row) = rows.next()? {
            fetched.push(read_row(row, &columns)?);
        }

        Ok(fetched)
    }

    fn prepare_statement<'a>(&'a self, sql: &str) -> DbResult<Box<dyn Statement + 'a>> {
        let stmt = self.prepare(sql)?;
        Ok(Box::new(SqliteStatement::new(stmt)))
    }
}

/// Prepared statement over a borrowed SQLite connection.
pub struct SqliteStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
    buffered: Vec<Row>,
    row_count: usize,
}

impl<'conn> SqliteStatement<'conn> {
    pub fn new(stmt: rusqlite::Statement<'conn>) -> Self {
        Self {
            stmt,
            buffered: Vec::new(),
            row_count: 0,
        }
    }

    fn resolve_index(&self, key: &ParamKey) -> DbResult<usize> {
        match key {
            ParamKey::Named(name) => self
                .stmt
                .parameter_index(name)?
                .ok_or_else(|| DbError::UnknownParameter(key.to_string())),
            ParamKey::Positional(index) => {
                if *index == 0 || *index > self.stmt.parameter_count() {
                    return Err(DbError::UnknownParameter(key.to_string()));
                }
                Ok(*index)
            }
        }
    }
}

impl Statement for SqliteStatement<'_> {
    fn bind_value(&mut self, key: &ParamKey, value: &Value, kind: ParamType) -> DbResult<()> {
        let index = self.resolve_index(key)?;
        let sql_value = to_sql_value(key, value, kind)?;
        self.stmt.raw_bind_parameter(index, sql_value)?;
        Ok(())
    }

    fn execute(&mut self) -> DbResult<bool> {
        self.buffered.clear();

        if self.stmt.column_count() == 0 {
            self.row_count = self.stmt.raw_execute()?;
        } else {
            let columns = column_names(&self.stmt);
            let mut fetched = Vec::new();
            let mut rows = self.stmt.raw_query();
            while let Some(row) = rows.next()? {
                fetched.push(read_row(row, &columns)?);
            }
            self.row_count = fetched.len();
            self.buffered = fetched;
        }

        debug!(
            "event=statement_execute module=db status=ok row_count={}",
            self.row_count
        );
        Ok(true)
    }

    fn row_count(&self) -> usize {
        self.row_count
    }

    fn fetch_all(&mut self) -> DbResult<Vec<Row>> {
        Ok(std::mem::take(&mut self.buffered))
    }
}

fn column_names(stmt: &rusqlite::Statement<'_>) -> Vec<String> {
    stmt.column_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn read_row(row: &rusqlite::Row<'_>, columns: &[String]) -> DbResult<Row> {
    let mut out = Row::new();
    for (index, column) in columns.iter().enumerate() {
        let value = match row.get_ref(index)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(value) => Value::Integer(value),
            ValueRef::Real(value) => Value::Real(value),
            ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Value::Text(text.to_string()),
                Err(source) => {
                    return Err(DbError::InvalidText {
                        column: column.clone(),
                        source,
                    })
                }
            },
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        };
        out.insert(column.as_str(), value);
    }
    Ok(out)
}

fn to_sql_value(key: &ParamKey, value: &Value, kind: ParamType) -> DbResult<SqlValue> {
    let converted = match (kind, value) {
        (ParamType::Null, Value::Null) => Some(SqlValue::Null),
        (ParamType::Integer, Value::Integer(v)) => Some(SqlValue::Integer(*v)),
        (ParamType::Boolean, Value::Boolean(v)) => Some(SqlValue::Integer(i64::from(*v))),
        (ParamType::String, Value::Text(v)) => Some(SqlValue::Text(v.clone())),
        _ => None,
    };

    converted.ok_or_else(|| DbError::BindTypeMismatch {
        key: key.to_string(),
        tag: kind,
        found: value.type_name(),
    })
}
