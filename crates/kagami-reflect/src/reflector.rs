//! Property descriptor construction
//!
//! A [`Reflector`] is built once per class and caches everything needed to
//! read and write its properties by name: accessor methods collected across
//! the superclass chain and every reachable interface, with overload
//! conflicts resolved by return-type covariance, plus direct field access
//! for properties without accessors.

use crate::error::{AccessorKind, ReflectError};
use crate::invoker::{ConstructorHandle, FieldHandle, Invoker, MethodHandle};
use crate::property;
use kagami_object::{
    ClassDef, ClassId, ClassRegistry, FieldDef, Instance, MethodDef, TypeRef, Value,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Identity of a logical method signature
///
/// Two methods with the same name and parameters but different declared
/// return types are distinct at collection time; covariant-return overrides
/// are reconciled later during accessor resolution.
#[derive(Clone, PartialEq, Eq, Hash)]
struct MethodSignature {
    return_type: TypeRef,
    name: String,
    params: Vec<TypeRef>,
}

impl MethodSignature {
    fn of(def: &MethodDef) -> Self {
        Self {
            return_type: def.return_type,
            name: def.name.clone(),
            params: def.params.clone(),
        }
    }
}

/// A collected method together with its declaring class
struct CollectedMethod {
    declaring: Arc<ClassDef>,
    def: MethodDef,
}

/// Cached property metadata for one class
///
/// Immutable after construction; build once (normally through
/// [`crate::ReflectorCache`]) and share freely across threads.
pub struct Reflector {
    class_id: ClassId,
    class_name: String,
    readable: Vec<String>,
    writable: Vec<String>,
    get_invokers: FxHashMap<String, Invoker>,
    set_invokers: FxHashMap<String, Invoker>,
    get_types: FxHashMap<String, TypeRef>,
    set_types: FxHashMap<String, TypeRef>,
    default_ctor: Option<ConstructorHandle>,
    case_insensitive: FxHashMap<String, String>,
}

impl Reflector {
    /// Introspect a class and build its descriptor
    pub fn build(registry: &ClassRegistry, id: ClassId) -> Result<Self, ReflectError> {
        let class = registry
            .get(id)
            .ok_or(ReflectError::UnknownClass { id })?;

        let mut reflector = Self {
            class_id: id,
            class_name: class.name.clone(),
            readable: Vec::new(),
            writable: Vec::new(),
            get_invokers: FxHashMap::default(),
            set_invokers: FxHashMap::default(),
            get_types: FxHashMap::default(),
            set_types: FxHashMap::default(),
            default_ctor: find_default_constructor(registry, class),
            case_insensitive: FxHashMap::default(),
        };

        let methods = collect_unique_methods(registry, id);
        reflector.resolve_getters(registry, &methods)?;
        reflector.resolve_setters(&methods)?;
        reflector.scan_fields(registry, id);
        reflector.build_name_index();
        Ok(reflector)
    }

    // ------------------------------------------------------------------
    // Accessor resolution
    // ------------------------------------------------------------------

    fn resolve_getters(
        &mut self,
        registry: &ClassRegistry,
        methods: &[CollectedMethod],
    ) -> Result<(), ReflectError> {
        let (order, groups) = group_by_property(methods, |def| {
            def.params.is_empty() && property::is_getter_name(&def.name)
        });

        for prop in &order {
            let candidates = &groups[prop];
            let winner = resolve_getter_conflict(registry, prop, candidates)?;
            self.add_getter(prop, winner);
        }
        Ok(())
    }

    fn resolve_setters(&mut self, methods: &[CollectedMethod]) -> Result<(), ReflectError> {
        let (order, groups) = group_by_property(methods, |def| {
            def.params.len() == 1 && property::is_setter_name(&def.name)
        });

        for prop in &order {
            let candidates = &groups[prop];
            let chosen = if candidates.len() == 1 {
                candidates[0]
            } else {
                // Multiple setter overloads: the resolved getter type is the
                // only signal for choosing between them.
                let expected = self.get_types.get(prop).copied();
                let exact = expected.and_then(|ty| {
                    candidates.iter().find(|m| m.def.params[0] == ty).copied()
                });
                exact.ok_or_else(|| ReflectError::AmbiguousAccessor {
                    kind: AccessorKind::Setter,
                    property: prop.clone(),
                    class_name: candidates[0].declaring.name.clone(),
                })?
            };
            self.add_setter(prop, chosen);
        }
        Ok(())
    }

    fn add_getter(&mut self, prop: &str, method: &CollectedMethod) {
        if !property::is_valid_property(prop) {
            return;
        }
        let handle = MethodHandle::new(&method.declaring, &method.def);
        self.get_invokers
            .insert(prop.to_string(), Invoker::Method(handle));
        self.get_types
            .insert(prop.to_string(), method.def.return_type);
        self.readable.push(prop.to_string());
    }

    fn add_setter(&mut self, prop: &str, method: &CollectedMethod) {
        if !property::is_valid_property(prop) {
            return;
        }
        let handle = MethodHandle::new(&method.declaring, &method.def);
        self.set_invokers
            .insert(prop.to_string(), Invoker::Method(handle));
        self.set_types
            .insert(prop.to_string(), method.def.params[0]);
        self.writable.push(prop.to_string());
    }

    // ------------------------------------------------------------------
    // Field fallback
    // ------------------------------------------------------------------

    fn scan_fields(&mut self, registry: &ClassRegistry, id: ClassId) {
        for class in registry.hierarchy(id) {
            for field in &class.fields {
                // Inaccessible fields contribute no accessor.
                if !registry.is_accessible(field.visibility) {
                    continue;
                }
                if !self.set_invokers.contains_key(&field.name)
                    && !(field.is_final && field.is_static)
                {
                    self.add_set_field(&class, field);
                }
                if !self.get_invokers.contains_key(&field.name) {
                    self.add_get_field(&class, field);
                }
            }
        }
    }

    fn add_get_field(&mut self, class: &Arc<ClassDef>, field: &FieldDef) {
        if !property::is_valid_property(&field.name) {
            return;
        }
        let handle = FieldHandle::new(class, field);
        self.get_invokers
            .insert(field.name.clone(), Invoker::FieldGet(handle));
        self.get_types.insert(field.name.clone(), field.ty);
        self.readable.push(field.name.clone());
    }

    fn add_set_field(&mut self, class: &Arc<ClassDef>, field: &FieldDef) {
        if !property::is_valid_property(&field.name) {
            return;
        }
        let handle = FieldHandle::new(class, field);
        self.set_invokers
            .insert(field.name.clone(), Invoker::FieldSet(handle));
        self.set_types.insert(field.name.clone(), field.ty);
        self.writable.push(field.name.clone());
    }

    fn build_name_index(&mut self) {
        for name in self.readable.iter().chain(self.writable.iter()) {
            self.case_insensitive
                .insert(name.to_uppercase(), name.clone());
        }
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    /// The described class's ID
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    /// The described class's name
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Whether the class has a readable property with this name
    pub fn has_getter(&self, name: &str) -> bool {
        self.get_invokers.contains_key(name)
    }

    /// Whether the class has a writable property with this name
    pub fn has_setter(&self, name: &str) -> bool {
        self.set_invokers.contains_key(name)
    }

    /// The declared type read from a property
    pub fn getter_type(&self, name: &str) -> Result<TypeRef, ReflectError> {
        self.get_types
            .get(name)
            .copied()
            .ok_or_else(|| self.no_such(AccessorKind::Getter, name))
    }

    /// The declared type written to a property
    pub fn setter_type(&self, name: &str) -> Result<TypeRef, ReflectError> {
        self.set_types
            .get(name)
            .copied()
            .ok_or_else(|| self.no_such(AccessorKind::Setter, name))
    }

    /// The read invoker for a property
    pub fn get_invoker(&self, name: &str) -> Result<&Invoker, ReflectError> {
        self.get_invokers
            .get(name)
            .ok_or_else(|| self.no_such(AccessorKind::Getter, name))
    }

    /// The write invoker for a property
    pub fn set_invoker(&self, name: &str) -> Result<&Invoker, ReflectError> {
        self.set_invokers
            .get(name)
            .ok_or_else(|| self.no_such(AccessorKind::Setter, name))
    }

    /// Readable property names, in discovery order
    pub fn readable_names(&self) -> &[String] {
        &self.readable
    }

    /// Writable property names, in discovery order
    pub fn writable_names(&self) -> &[String] {
        &self.writable
    }

    /// Resolve a property name case-insensitively to its canonical casing
    pub fn find_property(&self, name: &str) -> Option<&str> {
        self.case_insensitive
            .get(&name.to_uppercase())
            .map(String::as_str)
    }

    /// Whether the class exposes a usable zero-argument constructor
    pub fn has_default_constructor(&self) -> bool {
        self.default_ctor.is_some()
    }

    /// The zero-argument constructor handle
    pub fn default_constructor(&self) -> Result<&ConstructorHandle, ReflectError> {
        self.default_ctor
            .as_ref()
            .ok_or_else(|| ReflectError::NoDefaultConstructor {
                class_name: self.class_name.clone(),
            })
    }

    /// Read a property from a target instance
    pub fn get(&self, target: &mut Instance, name: &str) -> Result<Value, ReflectError> {
        self.get_invoker(name)?.invoke(target, &[])
    }

    /// Write a property on a target instance
    pub fn set(&self, target: &mut Instance, name: &str, value: Value) -> Result<(), ReflectError> {
        self.set_invoker(name)?.invoke(target, &[value])?;
        Ok(())
    }

    fn no_such(&self, kind: AccessorKind, name: &str) -> ReflectError {
        ReflectError::NoSuchAccessor {
            kind,
            property: name.to_string(),
            class_name: self.class_name.clone(),
        }
    }
}

impl std::fmt::Debug for Reflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflector")
            .field("class_name", &self.class_name)
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .finish()
    }
}

// ----------------------------------------------------------------------
// Collection helpers
// ----------------------------------------------------------------------

/// One method per distinct signature over the full superclass chain and
/// every transitively reachable interface, most-derived first.
///
/// A signature already recorded is never replaced, so subclass overrides
/// shadow superclass and interface declarations. Bridge methods and members
/// ruled out by the access policy are skipped.
fn collect_unique_methods(registry: &ClassRegistry, id: ClassId) -> Vec<CollectedMethod> {
    let mut seen: FxHashSet<MethodSignature> = FxHashSet::default();
    let mut collected = Vec::new();

    for class in registry.hierarchy(id) {
        record_unique(registry, &class, &mut seen, &mut collected);
        for iface in registry.interface_closure(class.id) {
            record_unique(registry, &iface, &mut seen, &mut collected);
        }
    }
    collected
}

fn record_unique(
    registry: &ClassRegistry,
    class: &Arc<ClassDef>,
    seen: &mut FxHashSet<MethodSignature>,
    out: &mut Vec<CollectedMethod>,
) {
    for def in &class.methods {
        if def.is_bridge {
            continue;
        }
        if !registry.is_accessible(def.visibility) {
            continue;
        }
        if seen.insert(MethodSignature::of(def)) {
            out.push(CollectedMethod {
                declaring: Arc::clone(class),
                def: def.clone(),
            });
        }
    }
}

/// Group accessor-shaped methods by derived property name, preserving the
/// order in which property names are first seen.
fn group_by_property<'a>(
    methods: &'a [CollectedMethod],
    shape: impl Fn(&MethodDef) -> bool,
) -> (Vec<String>, FxHashMap<String, Vec<&'a CollectedMethod>>) {
    let mut order: Vec<String> = Vec::new();
    let mut groups: FxHashMap<String, Vec<&CollectedMethod>> = FxHashMap::default();

    for method in methods {
        if !shape(&method.def) {
            continue;
        }
        let prop = match property::method_to_property(&method.def.name) {
            Some(prop) => prop,
            None => continue,
        };
        if !groups.contains_key(&prop) {
            order.push(prop.clone());
        }
        groups.entry(prop).or_default().push(method);
    }
    (order, groups)
}

/// Pick the single getter with the most-derived return type
///
/// Covariant-return overrides leave two collected entries for one property;
/// the narrower return type wins. Identical or incomparable return types
/// cannot be disambiguated.
fn resolve_getter_conflict<'a>(
    registry: &ClassRegistry,
    prop: &str,
    candidates: &[&'a CollectedMethod],
) -> Result<&'a CollectedMethod, ReflectError> {
    let mut iter = candidates.iter();
    let mut winner = *iter.next().expect("property group is never empty");
    let mut winner_ty = winner.def.return_type;

    for &candidate in iter {
        let ty = candidate.def.return_type;
        if ty == winner_ty {
            return Err(ambiguous_getter(prop, candidates));
        } else if registry.is_assignable(ty, winner_ty) {
            // Current winner is already the narrower type.
        } else if registry.is_assignable(winner_ty, ty) {
            winner = candidate;
            winner_ty = ty;
        } else {
            return Err(ambiguous_getter(prop, candidates));
        }
    }
    Ok(winner)
}

fn ambiguous_getter(prop: &str, candidates: &[&CollectedMethod]) -> ReflectError {
    ReflectError::AmbiguousAccessor {
        kind: AccessorKind::Getter,
        property: prop.to_string(),
        class_name: candidates[0].declaring.name.clone(),
    }
}

/// The first declared zero-argument constructor reachable under the policy
fn find_default_constructor(
    registry: &ClassRegistry,
    class: &Arc<ClassDef>,
) -> Option<ConstructorHandle> {
    class
        .constructors
        .iter()
        .find(|ctor| ctor.params.is_empty() && registry.is_accessible(ctor.visibility))
        .map(|ctor| ConstructorHandle::new(Arc::clone(class), ctor.clone()))
}
