//! Transform registry
//!
//! Named transform functions that schema definitions refer to by name.

use reshape_mapping::TransformFn;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of named transform functions
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, TransformFn>,
}

impl TransformRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in transforms
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::transforms::register_builtins(&mut registry);
        registry
    }

    /// Register a transform, replacing any previous one with the same name
    pub fn register(
        &mut self,
        name: impl Into<String>,
        func: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        let name = name.into();
        if self.transforms.insert(name.clone(), Arc::new(func)).is_some() {
            tracing::debug!(name = %name, "Replaced registered transform");
        }
        self
    }

    /// Get a transform by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TransformFn> {
        self.transforms.get(name).cloned()
    }

    /// Check if a transform exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.transforms.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered transforms
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.names())
            .finish()
    }
}
