//! Model factory registry.
//!
//! Maps caller-facing model names (for example `"User"`) to factory
//! functions, so bulk loads can pick a decoder by name at call time.

use crate::model::row::Row;
use crate::model::FromRow;
use crate::repo::RepoResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

static MODEL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid model name regex"));

/// Builds one model instance from a fetched row.
pub type ModelFactory<M> = fn(&Row) -> RepoResult<M>;

/// Factory registration/lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRegistryError {
    InvalidModelName(String),
    DuplicateModelName(String),
    ModelNotFound(String),
}

impl Display for ModelRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidModelName(value) => write!(f, "model name is invalid: `{value}`"),
            Self::DuplicateModelName(value) => {
                write!(f, "model name already registered: {value}")
            }
            Self::ModelNotFound(value) => write!(f, "model not registered: {value}"),
        }
    }
}

impl Error for ModelRegistryError {}

/// Name -> factory table, populated at startup and read at load time.
pub struct ModelRegistry<M> {
    factories: BTreeMap<String, ModelFactory<M>>,
}

impl<M> Default for ModelRegistry<M> {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<M> Debug for ModelRegistry<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.model_names())
            .finish()
    }
}

impl<M> ModelRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one factory under `name`.
    pub fn register(
        &mut self,
        name: &str,
        factory: ModelFactory<M>,
    ) -> Result<(), ModelRegistryError> {
        let name = name.trim();
        if !MODEL_NAME_RE.is_match(name) {
            return Err(ModelRegistryError::InvalidModelName(name.to_string()));
        }
        if self.factories.contains_key(name) {
            return Err(ModelRegistryError::DuplicateModelName(name.to_string()));
        }

        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    /// Registers `M::from_row` under `name`.
    pub fn register_from_row(&mut self, name: &str) -> Result<(), ModelRegistryError>
    where
        M: FromRow,
    {
        self.register(name, M::from_row)
    }

    pub fn get(&self, name: &str) -> Option<ModelFactory<M>> {
        self.factories.get(name.trim()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns sorted model names.
    pub fn model_names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Resolves `name` and builds one instance from `row`.
    pub fn build(&self, name: &str, row: &Row) -> RepoResult<M> {
        let factory = self.require(name)?;
        factory(row)
    }

    pub(crate) fn require(&self, name: &str) -> Result<ModelFactory<M>, ModelRegistryError> {
        self.get(name)
            .ok_or_else(|| ModelRegistryError::ModelNotFound(name.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ModelRegistry, ModelRegistryError};
    use crate::model::row::Row;
    use crate::model::value::Value;
    use crate::repo::RepoError;

    fn name_of(row: &Row) -> crate::repo::RepoResult<String> {
        Ok(row.get_string("name")?)
    }

    #[test]
    fn register_and_build_by_name() {
        let mut registry: ModelRegistry<String> = ModelRegistry::new();
        registry.register(" User ", name_of).unwrap();

        assert!(registry.contains("User"));
        let built = registry
            .build("User", &Row::new().with("name", "ada"))
            .unwrap();
        assert_eq!(built, "ada");
    }

    #[test]
    fn register_rejects_invalid_and_duplicate_names() {
        let mut registry: ModelRegistry<String> = ModelRegistry::new();

        assert_eq!(
            registry.register("Models\\User", name_of).unwrap_err(),
            ModelRegistryError::InvalidModelName("Models\\User".to_string())
        );
        assert_eq!(
            registry.register("", name_of).unwrap_err(),
            ModelRegistryError::InvalidModelName(String::new())
        );

        registry.register("User", name_of).unwrap();
        assert_eq!(
            registry.register("User", name_of).unwrap_err(),
            ModelRegistryError::DuplicateModelName("User".to_string())
        );
    }

    #[test]
    fn build_unknown_model_returns_registry_error() {
        let registry: ModelRegistry<Row> = ModelRegistry::new();
        let err = registry.build("Ghost", &Row::new()).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Registry(ModelRegistryError::ModelNotFound(name)) if name == "Ghost"
        ));
    }

    #[test]
    fn model_names_are_sorted() {
        let mut registry: ModelRegistry<Row> = ModelRegistry::new();
        registry.register_from_row("Zeta").unwrap();
        registry.register_from_row("Alpha").unwrap();

        assert_eq!(registry.model_names(), vec!["Alpha", "Zeta"]);
        let row = registry
            .build("Alpha", &Row::new().with("id", 1))
            .unwrap();
        assert_eq!(row.get("id"), Some(&Value::Integer(1)));
    }
}
