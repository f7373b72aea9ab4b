//! Placeholder keys and ordered bind lists for prepared statements.

use crate::model::value::Value;
use std::fmt::{Display, Formatter};

const NAMED_PREFIXES: [char; 3] = [':', '@', '$'];

/// Statement placeholder: a name such as `:id`, or a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Named(String),
    Positional(usize),
}

impl ParamKey {
    /// Named key; `:` is prepended when no SQLite prefix is present.
    pub fn named(name: &str) -> Self {
        let name = name.trim();
        if name.starts_with(NAMED_PREFIXES) {
            Self::Named(name.to_string())
        } else {
            Self::Named(format!(":{name}"))
        }
    }
}

impl Display for ParamKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Positional(index) => write!(f, "?{index}"),
        }
    }
}

impl From<&str> for ParamKey {
    fn from(value: &str) -> Self {
        Self::named(value)
    }
}

impl From<String> for ParamKey {
    fn from(value: String) -> Self {
        Self::named(&value)
    }
}

impl From<usize> for ParamKey {
    fn from(value: usize) -> Self {
        Self::Positional(value)
    }
}

/// Ordered placeholder -> value list; binding happens in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: Vec<(ParamKey, Value)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, key: impl Into<ParamKey>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<ParamKey>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<ParamKey>, V: Into<Value>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (key, value) in iter {
            bindings.push(key, value);
        }
        bindings
    }
}
