//! Model abstractions shared by the repository and its factories.
//!
//! # Responsibility
//! - Define how the repository reads fields from opaque model instances.
//! - Define how typed models are decoded from fetched rows.
//!
//! # Invariants
//! - Identifier comparison is strict: only integer `id` fields match.
//! - Decoders fail on malformed rows instead of defaulting fields.

use crate::repo::RepoResult;
use std::fmt::Debug;

pub mod registry;
pub mod row;
pub mod value;

use row::Row;
use value::Value;

/// Read access to the fields of a model instance.
pub trait Model: Debug {
    /// Returns the value of one named field, or `None` when the model has no
    /// such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Integer identifier used by `Repository::get_by_index`.
    fn id(&self) -> Option<i64> {
        self.field("id").and_then(|value| value.as_i64())
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }

    fn id(&self) -> Option<i64> {
        (**self).id()
    }
}

/// Schema-aware decoding of one row into a typed model.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> RepoResult<Self>;
}

/// A bare row is itself a model: every column is a field.
impl Model for Row {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl FromRow for Row {
    fn from_row(row: &Row) -> RepoResult<Self> {
        Ok(row.clone())
    }
}
