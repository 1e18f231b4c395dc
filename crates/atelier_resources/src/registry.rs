//! Blueprint registry.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::blueprint::ResourceBlueprint;
use crate::error::{RegistryError, RegistryResult};

/// Registry of resource blueprints.
///
/// Registration happens once, early, before any reads; afterwards the
/// registry is read concurrently by in-flight generation requests. A
/// read/write lock guards the underlying map accordingly: the write path
/// takes exclusive access, read paths take shared access.
#[derive(Default)]
pub struct BlueprintRegistry {
    blueprints: RwLock<HashMap<String, ResourceBlueprint>>,
}

impl BlueprintRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blueprint. Names are unique; registering an existing name
    /// fails.
    pub fn register(&self, blueprint: ResourceBlueprint) -> RegistryResult<()> {
        let mut blueprints = self.write();
        if blueprints.contains_key(&blueprint.name) {
            return Err(RegistryError::Duplicate(blueprint.name));
        }
        debug!(name = %blueprint.name, "Registering resource blueprint");
        blueprints.insert(blueprint.name.clone(), blueprint);
        Ok(())
    }

    /// Retrieve a blueprint by name.
    pub fn get(&self, name: &str) -> RegistryResult<ResourceBlueprint> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Check whether a blueprint is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// All blueprints, sorted by name.
    pub fn list(&self) -> Vec<ResourceBlueprint> {
        let mut blueprints: Vec<_> = self.read().values().cloned().collect();
        blueprints.sort_by(|a, b| a.name.cmp(&b.name));
        blueprints
    }

    /// Blueprints in the given category, sorted by name.
    pub fn list_by_category(&self, category: &str) -> Vec<ResourceBlueprint> {
        let mut blueprints: Vec<_> = self
            .read()
            .values()
            .filter(|b| b.category == category)
            .cloned()
            .collect();
        blueprints.sort_by(|a, b| a.name.cmp(&b.name));
        blueprints
    }

    /// All blueprint names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// All distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<_> = self.read().values().map(|b| b.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ResourceBlueprint>> {
        self.blueprints.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ResourceBlueprint>> {
        self.blueprints.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for BlueprintRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueprintRegistry")
            .field("blueprints", &self.names())
            .finish()
    }
}
