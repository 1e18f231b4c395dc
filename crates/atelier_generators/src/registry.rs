//! Generator registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::GeneratorError;
use crate::generator::Generator;

/// Registry of deployment artifact generators.
///
/// An explicit, caller-owned instance: construct it once at process start,
/// register the generators in use, and pass it by reference to every
/// consumer. Reads are concurrent; registration takes the write lock.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: RwLock<HashMap<String, Arc<dyn Generator>>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator under its `name()`. Duplicate names are
    /// rejected.
    pub fn register(&self, generator: Arc<dyn Generator>) -> Result<(), GeneratorError> {
        let name = generator.name().to_string();
        if name.is_empty() {
            return Err(GeneratorError::validation("generator name cannot be empty"));
        }
        let mut generators = self.write();
        if generators.contains_key(&name) {
            return Err(GeneratorError::AlreadyRegistered(name));
        }
        debug!(name = %name, "Registering generator");
        generators.insert(name, generator);
        Ok(())
    }

    /// Retrieve a generator by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Generator>, GeneratorError> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| GeneratorError::NotFound(name.to_string()))
    }

    /// All generators, sorted by name.
    pub fn list(&self) -> Vec<Arc<dyn Generator>> {
        let mut generators: Vec<_> = self.read().values().cloned().collect();
        generators.sort_by(|a, b| a.name().cmp(b.name()));
        generators
    }

    /// All generator names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Generator>>> {
        self.generators.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Generator>>> {
        self.generators.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.names())
            .finish()
    }
}
