//! Class registry: lookup, hierarchy walking, and assignability

use crate::class::{ClassDef, Visibility};
use crate::types::{ClassId, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Policy for opening non-public members to reflective access
///
/// Models the environment either permitting reflective access to private
/// members or restricting reflection to the public surface. Members ruled
/// out by the policy are silently invisible to the reflection layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    /// Non-public members may be opened for reflective access
    #[default]
    OpenAll,
    /// Only public members are reachable
    PublicOnly,
}

/// Registry of all classes and interfaces known to the runtime
#[derive(Debug, Default)]
pub struct ClassRegistry {
    /// Definitions indexed by ID
    classes: Vec<Arc<ClassDef>>,
    /// Class name to ID mapping
    name_to_id: FxHashMap<String, ClassId>,
    /// Reflective access policy for this registry
    policy: AccessPolicy,
}

impl ClassRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with an explicit access policy
    pub fn with_policy(policy: AccessPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The registry's reflective access policy
    pub fn access_policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Change the reflective access policy
    pub fn set_access_policy(&mut self, policy: AccessPolicy) {
        self.policy = policy;
    }

    /// Whether a member with the given visibility is reachable under the policy
    pub fn is_accessible(&self, visibility: Visibility) -> bool {
        visibility == Visibility::Public || self.policy == AccessPolicy::OpenAll
    }

    /// ID the next registered class will receive
    pub(crate) fn next_class_id(&self) -> ClassId {
        ClassId::new(self.classes.len() as u32)
    }

    /// Insert a finished definition. The builder assigns IDs and slots.
    pub(crate) fn insert(&mut self, def: ClassDef) -> ClassId {
        let id = def.id;
        self.name_to_id.insert(def.name.clone(), id);
        self.classes.push(Arc::new(def));
        id
    }

    /// Get a class by ID
    pub fn get(&self, id: ClassId) -> Option<&Arc<ClassDef>> {
        self.classes.get(id.raw() as usize)
    }

    /// Get a class by name
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<ClassDef>> {
        self.name_to_id.get(name).and_then(|id| self.get(*id))
    }

    /// Whether a name is already registered
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate over all registered classes
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassDef>> {
        self.classes.iter()
    }

    /// The superclass chain starting at `id` (most-derived first)
    pub fn hierarchy(&self, id: ClassId) -> Vec<Arc<ClassDef>> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            match self.get(cid) {
                Some(class) => {
                    chain.push(Arc::clone(class));
                    current = class.parent;
                }
                None => break,
            }
        }
        chain
    }

    /// Every interface transitively reachable from `id`'s direct interfaces
    ///
    /// Order is breadth-first from the declaration order, deduplicated.
    pub fn interface_closure(&self, id: ClassId) -> Vec<Arc<ClassDef>> {
        let mut seen = FxHashSet::default();
        let mut queue: Vec<ClassId> = match self.get(id) {
            Some(class) => class.interfaces.clone(),
            None => Vec::new(),
        };
        let mut closure = Vec::new();

        let mut i = 0;
        while i < queue.len() {
            let iface_id = queue[i];
            i += 1;
            if !seen.insert(iface_id) {
                continue;
            }
            if let Some(iface) = self.get(iface_id) {
                queue.extend(iface.interfaces.iter().copied());
                closure.push(Arc::clone(iface));
            }
        }
        closure
    }

    /// Check whether `sub` is `sup` or a descendant of it
    ///
    /// Walks the superclass chain and every reachable interface.
    pub fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup {
            return true;
        }
        let mut seen = FxHashSet::default();
        let mut queue = vec![sub];
        while let Some(cid) = queue.pop() {
            if !seen.insert(cid) {
                continue;
            }
            if cid == sup {
                return true;
            }
            if let Some(class) = self.get(cid) {
                queue.extend(class.parent);
                queue.extend(class.interfaces.iter().copied());
            }
        }
        false
    }

    /// Check whether a `source` value is usable where `target` is expected
    ///
    /// Scalars are only assignable to themselves; object types follow the
    /// nominal class/interface hierarchy.
    pub fn is_assignable(&self, target: TypeRef, source: TypeRef) -> bool {
        if target == source {
            return true;
        }
        match (target, source) {
            (TypeRef::Object(sup), TypeRef::Object(sub)) => self.is_subclass_of(sub, sup),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ClassBuilder;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ClassRegistry::new();
        let id = ClassBuilder::new("Point").register(&mut registry).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).unwrap().name, "Point");
        assert_eq!(registry.get_by_name("Point").unwrap().id, id);
        assert!(registry.get_by_name("Missing").is_none());
    }

    #[test]
    fn test_hierarchy_most_derived_first() {
        let mut registry = ClassRegistry::new();
        let animal = ClassBuilder::new("Animal").register(&mut registry).unwrap();
        let dog = ClassBuilder::new("Dog")
            .extends(animal)
            .register(&mut registry)
            .unwrap();
        let labrador = ClassBuilder::new("Labrador")
            .extends(dog)
            .register(&mut registry)
            .unwrap();

        let chain = registry.hierarchy(labrador);
        let names: Vec<&str> = chain.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Labrador", "Dog", "Animal"]);
    }

    #[test]
    fn test_is_subclass_of_through_classes() {
        let mut registry = ClassRegistry::new();
        let animal = ClassBuilder::new("Animal").register(&mut registry).unwrap();
        let dog = ClassBuilder::new("Dog")
            .extends(animal)
            .register(&mut registry)
            .unwrap();

        assert!(registry.is_subclass_of(dog, animal));
        assert!(registry.is_subclass_of(dog, dog));
        assert!(!registry.is_subclass_of(animal, dog));
    }

    #[test]
    fn test_is_subclass_of_through_interfaces() {
        let mut registry = ClassRegistry::new();
        let closeable = ClassBuilder::interface("Closeable")
            .register(&mut registry)
            .unwrap();
        let channel = ClassBuilder::interface("Channel")
            .extends_interface(closeable)
            .register(&mut registry)
            .unwrap();
        let socket = ClassBuilder::new("Socket")
            .implements(channel)
            .register(&mut registry)
            .unwrap();

        assert!(registry.is_subclass_of(socket, channel));
        assert!(registry.is_subclass_of(socket, closeable));
        assert!(!registry.is_subclass_of(closeable, socket));
    }

    #[test]
    fn test_interface_closure_is_transitive_and_deduplicated() {
        let mut registry = ClassRegistry::new();
        let a = ClassBuilder::interface("A").register(&mut registry).unwrap();
        let b = ClassBuilder::interface("B")
            .extends_interface(a)
            .register(&mut registry)
            .unwrap();
        let c = ClassBuilder::interface("C")
            .extends_interface(a)
            .register(&mut registry)
            .unwrap();
        let impl_id = ClassBuilder::new("Impl")
            .implements(b)
            .implements(c)
            .register(&mut registry)
            .unwrap();

        let closure = registry.interface_closure(impl_id);
        let names: Vec<&str> = closure.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B", "C", "A"]);
    }

    #[test]
    fn test_assignability() {
        let mut registry = ClassRegistry::new();
        let animal = ClassBuilder::new("Animal").register(&mut registry).unwrap();
        let dog = ClassBuilder::new("Dog")
            .extends(animal)
            .register(&mut registry)
            .unwrap();

        assert!(registry.is_assignable(TypeRef::Int, TypeRef::Int));
        assert!(!registry.is_assignable(TypeRef::Int, TypeRef::Float));
        assert!(registry.is_assignable(TypeRef::Object(animal), TypeRef::Object(dog)));
        assert!(!registry.is_assignable(TypeRef::Object(dog), TypeRef::Object(animal)));
    }

    #[test]
    fn test_access_policy() {
        let mut registry = ClassRegistry::new();
        assert!(registry.is_accessible(Visibility::Private));

        registry.set_access_policy(AccessPolicy::PublicOnly);
        assert!(registry.is_accessible(Visibility::Public));
        assert!(!registry.is_accessible(Visibility::Protected));
        assert!(!registry.is_accessible(Visibility::Private));
    }
}
