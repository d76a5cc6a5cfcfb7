//! Process-wide descriptor cache
//!
//! Class shapes are assumed immutable for the process lifetime, so a
//! descriptor built once can be shared by every caller. Reads never take a
//! global lock; concurrent first requests for the same class may both build,
//! with the last published result winning for all callers thereafter.

use crate::error::ReflectError;
use crate::reflector::Reflector;
use dashmap::DashMap;
use kagami_object::{ClassId, ClassRegistry};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static GLOBAL: Lazy<ReflectorCache> = Lazy::new(ReflectorCache::new);

/// Cache of built descriptors, keyed by class ID
pub struct ReflectorCache {
    descriptors: DashMap<ClassId, Arc<Reflector>>,
    enabled: AtomicBool,
}

impl ReflectorCache {
    /// Create a new empty cache with caching enabled
    pub fn new() -> Self {
        Self {
            descriptors: DashMap::new(),
            enabled: AtomicBool::new(true),
        }
    }

    /// The process-wide cache used by [`describe`]
    ///
    /// Keys are class IDs, so the global cache assumes a single long-lived
    /// registry; tests and embedders juggling several registries should hold
    /// their own `ReflectorCache` per registry.
    pub fn global() -> &'static ReflectorCache {
        &GLOBAL
    }

    /// Get the cached descriptor for a class, building it on first use
    ///
    /// With caching disabled every call builds a fresh descriptor and
    /// retains nothing (the bypass mode for tests). A failed build publishes
    /// nothing.
    pub fn describe(
        &self,
        registry: &ClassRegistry,
        id: ClassId,
    ) -> Result<Arc<Reflector>, ReflectError> {
        if !self.is_enabled() {
            return Ok(Arc::new(Reflector::build(registry, id)?));
        }
        if let Some(existing) = self.descriptors.get(&id) {
            return Ok(Arc::clone(&existing));
        }
        let built = Arc::new(Reflector::build(registry, id)?);
        self.descriptors.insert(id, Arc::clone(&built));
        Ok(built)
    }

    /// Whether caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Turn caching on or off
    ///
    /// Disabling does not drop already-published descriptors; re-enabling
    /// makes them visible again.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Drop every cached descriptor
    pub fn clear(&self) {
        self.descriptors.clear();
    }

    /// Number of cached descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for ReflectorCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Describe a class through the process-wide cache
///
/// The sole entry point for normal use; see [`ReflectorCache::global`] for
/// the keying assumption.
pub fn describe(registry: &ClassRegistry, id: ClassId) -> Result<Arc<Reflector>, ReflectError> {
    ReflectorCache::global().describe(registry, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kagami_object::{ClassBuilder, FieldDef, TypeRef};

    fn point_registry() -> (ClassRegistry, ClassId) {
        let mut registry = ClassRegistry::new();
        let id = ClassBuilder::new("Point")
            .field(FieldDef::new("x", TypeRef::Int))
            .field(FieldDef::new("y", TypeRef::Int))
            .register(&mut registry)
            .unwrap();
        (registry, id)
    }

    #[test]
    fn test_describe_caches_descriptor() {
        let (registry, id) = point_registry();
        let cache = ReflectorCache::new();

        let first = cache.describe(&registry, id).unwrap();
        let second = cache.describe(&registry, id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disabled_cache_builds_fresh() {
        let (registry, id) = point_registry();
        let cache = ReflectorCache::new();
        cache.set_enabled(false);

        let first = cache.describe(&registry, id).unwrap();
        let second = cache.describe(&registry, id).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());

        // Same property surface either way.
        assert_eq!(first.readable_names(), second.readable_names());
    }

    #[test]
    fn test_clear_drops_descriptors() {
        let (registry, id) = point_registry();
        let cache = ReflectorCache::new();

        cache.describe(&registry, id).unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let registry = ClassRegistry::new();
        let cache = ReflectorCache::new();

        assert!(cache.describe(&registry, ClassId::new(3)).is_err());
        assert!(cache.is_empty());
    }
}
