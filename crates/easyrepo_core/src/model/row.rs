//! Result-set row representation.
//!
//! # Responsibility
//! - Carry one fetched row as an ordered column -> value mapping.
//! - Offer typed accessors so model decoders fail explicitly on bad data.
//!
//! # Invariants
//! - Column order follows the result set.
//! - Column names are unique; inserting an existing name replaces its value.

use crate::model::value::Value;
use crate::repo::RepoError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Typed access failure on a [`Row`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    MissingColumn(String),
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl Display for RowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "missing column `{column}`"),
            Self::TypeMismatch {
                column,
                expected,
                found,
            } => write!(
                f,
                "column `{column}` expected {expected} value, found {found}"
            ),
        }
    }
}

impl Error for RowError {}

impl From<RowError> for RepoError {
    fn from(value: RowError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// One fetched row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get_i64(&self, column: &str) -> Result<i64, RowError> {
        let value = self.require(column)?;
        value
            .as_i64()
            .ok_or_else(|| mismatch(column, "integer", value))
    }

    pub fn get_opt_i64(&self, column: &str) -> Result<Option<i64>, RowError> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Integer(value) => Ok(Some(*value)),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    pub fn get_string(&self, column: &str) -> Result<String, RowError> {
        let value = self.require(column)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(column, "text", value))
    }

    pub fn get_opt_string(&self, column: &str) -> Result<Option<String>, RowError> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Text(value) => Ok(Some(value.clone())),
            other => Err(mismatch(column, "text", other)),
        }
    }

    pub fn get_bool(&self, column: &str) -> Result<bool, RowError> {
        let value = self.require(column)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(column, "boolean", value))
    }

    pub fn get_f64(&self, column: &str) -> Result<f64, RowError> {
        let value = self.require(column)?;
        value.as_f64().ok_or_else(|| mismatch(column, "real", value))
    }

    fn require(&self, column: &str) -> Result<&Value, RowError> {
        self.get(column)
            .ok_or_else(|| RowError::MissingColumn(column.to_string()))
    }
}

fn mismatch(column: &str, expected: &'static str, found: &Value) -> RowError {
    RowError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: found.type_name(),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{Row, RowError};
    use crate::model::value::Value;

    #[test]
    fn insert_keeps_column_order_and_replaces_duplicates() {
        let mut row = Row::new().with("id", 1).with("name", "a");
        row.insert("id", 2);

        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(row.get("id"), Some(&Value::Integer(2)));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn collects_from_pairs_and_iterates_in_column_order() {
        let row: Row = [
            ("id", Value::from(4)),
            ("name", Value::from("cleo")),
            ("id", Value::from(5)),
        ]
        .into_iter()
        .collect();

        let cells: Vec<(&str, &Value)> = row.iter().collect();
        assert_eq!(
            cells,
            vec![("id", &Value::Integer(5)), ("name", &Value::from("cleo"))]
        );
    }

    #[test]
    fn typed_accessors_report_missing_and_mismatched_columns() {
        let row = Row::new().with("id", "seven").with("note", None::<String>);

        assert_eq!(
            row.get_i64("missing").unwrap_err(),
            RowError::MissingColumn("missing".to_string())
        );
        assert!(matches!(
            row.get_i64("id").unwrap_err(),
            RowError::TypeMismatch {
                expected: "integer",
                found: "text",
                ..
            }
        ));
        assert_eq!(row.get_opt_string("note").unwrap(), None);
    }

    #[test]
    fn bool_accessor_accepts_sqlite_integers() {
        let row = Row::new().with("active", 1).with("hidden", false);
        assert!(row.get_bool("active").unwrap());
        assert!(!row.get_bool("hidden").unwrap());
    }

    #[test]
    fn serializes_as_ordered_json_object() {
        let row = Row::new().with("id", 3).with("name", "x");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":3,"name":"x"}"#);
    }
}
