//! Column values and bind type tags.
//!
//! # Responsibility
//! - Give result-set cells one explicit variant type instead of untyped data.
//! - Classify bind values into the tag used by prepared statements.
//!
//! # Invariants
//! - Only `Integer`, `Boolean`, `Null` and `Text` values can be bound.
//! - `Real` and `Blob` values are readable from rows but rejected at bind time.
//! - Loose equality against a search string compares numerically whenever
//!   both sides are numeric, and compares booleans by truthiness.

use crate::repo::{RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// Decimal or exponent notation, surrounding whitespace allowed.
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[ \t\n\r\x0B\x0C]*[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?[ \t\n\r\x0B\x0C]*$",
    )
    .expect("valid numeric string regex")
});

/// One cell of a result row, or one value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Stable lowercase name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Booleans are read back from SQLite as `0`/`1` integers, so both shapes
    /// are accepted.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            Self::Integer(0) => Some(false),
            Self::Integer(1) => Some(true),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Renders the value as seen by a loose, string-based comparison.
    ///
    /// `Null` and `false` render as the empty string, `true` as `"1"`.
    pub fn loose_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Boolean(true) => "1".to_string(),
            Self::Boolean(false) => String::new(),
            Self::Integer(value) => value.to_string(),
            Self::Real(value) => value.to_string(),
            Self::Text(value) => value.clone(),
            Self::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Loose equality against a search string.
    ///
    /// - `Boolean` compares with the truthiness of `search` (`""` and `"0"`
    ///   are false, anything else is true).
    /// - `Null` equals only the empty string.
    /// - Numbers equal a numeric `search` by value (`7 == "07"`,
    ///   `7 == "7.0"`); otherwise their decimal text must match exactly.
    /// - Text equals `search` by value when both are numeric
    ///   (`"007" == "7"`); otherwise byte for byte.
    pub fn loosely_equals(&self, search: &str) -> bool {
        match self {
            Self::Null => search.is_empty(),
            Self::Boolean(value) => *value == text_truthy(search),
            Self::Integer(value) => match parse_numeric(search) {
                Some(Numeric::Integer(other)) => *value == other,
                Some(Numeric::Real(other)) => (*value as f64) == other,
                None => value.to_string() == search,
            },
            Self::Real(value) => match parse_numeric(search) {
                Some(other) => *value == other.as_f64(),
                None => value.to_string() == search,
            },
            Self::Text(value) => numeric_text_equals(value, search),
            Self::Blob(bytes) => numeric_text_equals(&String::from_utf8_lossy(bytes), search),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Integer(i64),
    Real(f64),
}

impl Numeric {
    fn as_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Real(value) => value,
        }
    }
}

/// Parses a numeric string; integers that fit `i64` stay exact.
fn parse_numeric(text: &str) -> Option<Numeric> {
    if !NUMERIC_RE.is_match(text) {
        return None;
    }
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0B');
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(Numeric::Integer(value));
    }
    trimmed.parse::<f64>().ok().map(Numeric::Real)
}

fn numeric_text_equals(left: &str, right: &str) -> bool {
    match (parse_numeric(left), parse_numeric(right)) {
        (Some(Numeric::Integer(a)), Some(Numeric::Integer(b))) => a == b,
        (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn text_truthy(text: &str) -> bool {
    !(text.is_empty() || text == "0")
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Blob(bytes) => write!(f, "<blob {} bytes>", bytes.len()),
            other => write!(f, "{}", other.loose_text()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

macro_rules! integer_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_value_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Real(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Bind mode selected for a placeholder value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Integer,
    Boolean,
    Null,
    String,
}

impl ParamType {
    /// Classifies a bind value by its runtime variant.
    ///
    /// # Errors
    /// - `RepoError::UnsupportedParameterType` for `Real` and `Blob` values.
    pub fn classify(value: &Value) -> RepoResult<Self> {
        match value {
            Value::Integer(_) => Ok(Self::Integer),
            Value::Boolean(_) => Ok(Self::Boolean),
            Value::Null => Ok(Self::Null),
            Value::Text(_) => Ok(Self::String),
            other => Err(RepoError::UnsupportedParameterType {
                type_name: other.type_name(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::String => "string",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ParamType, Value};
    use crate::repo::RepoError;

    #[test]
    fn classify_maps_each_bindable_variant() {
        assert_eq!(ParamType::classify(&Value::from(7)).unwrap(), ParamType::Integer);
        assert_eq!(ParamType::classify(&Value::from(true)).unwrap(), ParamType::Boolean);
        assert_eq!(ParamType::classify(&Value::Null).unwrap(), ParamType::Null);
        assert_eq!(ParamType::classify(&Value::from("x")).unwrap(), ParamType::String);
    }

    #[test]
    fn classify_rejects_real_and_blob() {
        let err = ParamType::classify(&Value::from(1.5)).unwrap_err();
        assert!(matches!(
            err,
            RepoError::UnsupportedParameterType { type_name: "real" }
        ));

        let err = ParamType::classify(&Value::from(vec![1_u8, 2])).unwrap_err();
        assert!(matches!(
            err,
            RepoError::UnsupportedParameterType { type_name: "blob" }
        ));
    }

    #[test]
    fn loose_equality_compares_numbers_by_value() {
        assert!(Value::Integer(7).loosely_equals("7"));
        assert!(Value::Integer(7).loosely_equals("07"));
        assert!(Value::Integer(7).loosely_equals("7.0"));
        assert!(Value::Integer(7).loosely_equals(" 7"));
        assert!(Value::Integer(10).loosely_equals("1e1"));
        assert!(Value::Real(2.5).loosely_equals("2.50"));
        assert!(!Value::Integer(7).loosely_equals("7abc"));
        assert!(!Value::Integer(7).loosely_equals("8"));
        assert!(!Value::Integer(0).loosely_equals(""));

        assert!(Value::from("007").loosely_equals("7"));
        assert!(Value::from("1e3").loosely_equals("1000"));
        assert!(!Value::from("abc").loosely_equals("ABC"));
        assert!(!Value::from("7a").loosely_equals("7"));
        assert!(Value::from("ada").loosely_equals("ada"));
    }

    #[test]
    fn loose_equality_compares_booleans_by_truthiness() {
        assert!(Value::Boolean(true).loosely_equals("1"));
        assert!(Value::Boolean(true).loosely_equals("yes"));
        assert!(!Value::Boolean(true).loosely_equals("0"));
        assert!(!Value::Boolean(true).loosely_equals(""));
        assert!(Value::Boolean(false).loosely_equals("0"));
        assert!(Value::Boolean(false).loosely_equals(""));
        assert!(!Value::Boolean(false).loosely_equals("no"));
    }

    #[test]
    fn loose_equality_matches_null_only_to_empty_text() {
        assert!(Value::Null.loosely_equals(""));
        assert!(!Value::Null.loosely_equals("0"));
        assert!(!Value::Null.loosely_equals("null"));
    }

    #[test]
    fn option_none_converts_to_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }

    #[test]
    fn serializes_untagged_json() {
        let json = serde_json::to_string(&vec![
            Value::Integer(3),
            Value::Null,
            Value::from("a"),
        ])
        .unwrap();
        assert_eq!(json, r#"[3,null,"a"]"#);
    }

    #[test]
    fn deserializes_untagged_json() {
        let values: Vec<Value> = serde_json::from_str(r#"[3,null,"a",true,1.5]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Integer(3),
                Value::Null,
                Value::from("a"),
                Value::Boolean(true),
                Value::Real(1.5),
            ]
        );
    }
}
