//! Fluent builder for registering classes and interfaces

use crate::class::{ClassDef, ClassKind, ConstructorDef, FieldDef, MethodDef};
use crate::error::DefineError;
use crate::registry::ClassRegistry;
use crate::types::{ClassId, TypeRef};
use crate::value::Value;
use parking_lot::RwLock;

enum PendingAccessor {
    Getter { method: String, field: String },
    Setter { method: String, field: String },
}

/// Builder for a class or interface definition
///
/// Collects declarations and registers the finished definition, assigning
/// the class ID and instance field slots (after the parent's slots).
pub struct ClassBuilder {
    name: String,
    kind: ClassKind,
    parent: Option<ClassId>,
    interfaces: Vec<ClassId>,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    constructors: Vec<ConstructorDef>,
    accessors: Vec<PendingAccessor>,
}

impl ClassBuilder {
    /// Start building a class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Start building an interface
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Interface,
            ..Self::new(name)
        }
    }

    /// Set the superclass
    pub fn extends(mut self, parent: ClassId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, iface: ClassId) -> Self {
        self.interfaces.push(iface);
        self
    }

    /// Add an extended superinterface (interfaces only)
    pub fn extends_interface(mut self, iface: ClassId) -> Self {
        self.interfaces.push(iface);
        self
    }

    /// Declare a field
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a method
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Declare a constructor
    pub fn constructor(mut self, ctor: ConstructorDef) -> Self {
        self.constructors.push(ctor);
        self
    }

    /// Declare a getter method backed by a named instance field
    ///
    /// The field may be declared on this class or inherited; its slot and
    /// type are resolved at registration.
    pub fn property_getter(mut self, method: impl Into<String>, field: impl Into<String>) -> Self {
        self.accessors.push(PendingAccessor::Getter {
            method: method.into(),
            field: field.into(),
        });
        self
    }

    /// Declare a setter method backed by a named instance field
    pub fn property_setter(mut self, method: impl Into<String>, field: impl Into<String>) -> Self {
        self.accessors.push(PendingAccessor::Setter {
            method: method.into(),
            field: field.into(),
        });
        self
    }

    /// Validate the definition and register it
    pub fn register(mut self, registry: &mut ClassRegistry) -> Result<ClassId, DefineError> {
        if registry.contains_name(&self.name) {
            return Err(DefineError::DuplicateClass { name: self.name });
        }

        let parent_slots = match self.parent {
            Some(pid) => {
                if self.kind == ClassKind::Interface {
                    return Err(DefineError::InterfaceWithParent { name: self.name });
                }
                let parent = registry
                    .get(pid)
                    .ok_or(DefineError::UnknownParent { id: pid })?;
                if parent.kind != ClassKind::Class {
                    return Err(DefineError::ParentNotAClass { name: self.name });
                }
                parent.slot_count
            }
            None => 0,
        };

        for iface_id in &self.interfaces {
            let iface = registry
                .get(*iface_id)
                .ok_or(DefineError::UnknownInterface { id: *iface_id })?;
            if iface.kind != ClassKind::Interface {
                return Err(DefineError::NotAnInterface {
                    name: iface.name.clone(),
                });
            }
        }

        if self.kind == ClassKind::Interface && self.fields.iter().any(|f| !f.is_static) {
            return Err(DefineError::InterfaceField { name: self.name });
        }

        // Slot assignment: instance slots continue after the parent's,
        // static slots index this class's own static storage.
        let mut statics = Vec::new();
        let mut next_instance_slot = parent_slots;
        for field in &mut self.fields {
            if field.is_static {
                field.slot = statics.len();
                statics.push(RwLock::new(field.initial.clone().unwrap_or(Value::Null)));
            } else {
                field.slot = next_instance_slot;
                next_instance_slot += 1;
            }
        }

        for accessor in &self.accessors {
            let (method_name, field_name) = match accessor {
                PendingAccessor::Getter { method, field } => (method, field),
                PendingAccessor::Setter { method, field } => (method, field),
            };
            let (slot, ty) = resolve_instance_field(registry, &self.fields, self.parent, field_name)
                .ok_or_else(|| DefineError::UnknownField {
                    class_name: self.name.clone(),
                    field: field_name.clone(),
                })?;
            let def = match accessor {
                PendingAccessor::Getter { .. } => MethodDef::slot_getter(method_name, slot, ty),
                PendingAccessor::Setter { .. } => MethodDef::slot_setter(method_name, slot, ty),
            };
            self.methods.push(def);
        }

        let def = ClassDef {
            id: registry.next_class_id(),
            name: self.name,
            kind: self.kind,
            parent: self.parent,
            interfaces: self.interfaces,
            methods: self.methods,
            fields: self.fields,
            constructors: self.constructors,
            slot_count: next_instance_slot,
            statics,
        };
        Ok(registry.insert(def))
    }
}

/// Find an instance field's (slot, type) among the builder's own fields or
/// up the parent chain.
fn resolve_instance_field(
    registry: &ClassRegistry,
    own_fields: &[FieldDef],
    parent: Option<ClassId>,
    name: &str,
) -> Option<(usize, TypeRef)> {
    if let Some(field) = own_fields.iter().find(|f| f.name == name && !f.is_static) {
        return Some((field.slot, field.ty));
    }
    let mut current = parent;
    while let Some(cid) = current {
        let class = registry.get(cid)?;
        if let Some(field) = class.fields.iter().find(|f| f.name == name && !f.is_static) {
            return Some((field.slot, field.ty));
        }
        current = class.parent;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;

    #[test]
    fn test_slots_continue_after_parent() {
        let mut registry = ClassRegistry::new();
        let base = ClassBuilder::new("Base")
            .field(FieldDef::new("a", TypeRef::Int))
            .field(FieldDef::new("b", TypeRef::Int))
            .register(&mut registry)
            .unwrap();
        let derived = ClassBuilder::new("Derived")
            .extends(base)
            .field(FieldDef::new("c", TypeRef::Str))
            .register(&mut registry)
            .unwrap();

        let derived_def = registry.get(derived).unwrap();
        assert_eq!(derived_def.slot_count, 3);
        assert_eq!(derived_def.find_field("c").unwrap().slot(), 2);
    }

    #[test]
    fn test_static_fields_use_separate_slots() {
        let mut registry = ClassRegistry::new();
        let id = ClassBuilder::new("Counter")
            .field(FieldDef::new("value", TypeRef::Int))
            .field(
                FieldDef::new("total", TypeRef::Int)
                    .as_static()
                    .with_initial(Value::Int(100)),
            )
            .register(&mut registry)
            .unwrap();

        let def = registry.get(id).unwrap();
        assert_eq!(def.slot_count, 1);
        assert_eq!(def.find_field("total").unwrap().slot(), 0);
        assert_eq!(def.get_static(0), Some(Value::Int(100)));
    }

    #[test]
    fn test_property_accessor_wiring() {
        let mut registry = ClassRegistry::new();
        let id = ClassBuilder::new("User")
            .field(FieldDef::new("name", TypeRef::Str))
            .property_getter("getName", "name")
            .property_setter("setName", "name")
            .register(&mut registry)
            .unwrap();

        let def = registry.get(id).unwrap();
        let getter = def.methods.iter().find(|m| m.name == "getName").unwrap();
        assert_eq!(getter.return_type, TypeRef::Str);
        assert!(getter.params.is_empty());

        let setter = def.methods.iter().find(|m| m.name == "setName").unwrap();
        assert_eq!(setter.params, vec![TypeRef::Str]);
        assert_eq!(setter.return_type, TypeRef::Void);

        let mut obj = Instance::new(id, def.slot_count);
        let set_body = setter.body.as_ref().unwrap();
        set_body(&mut obj, &[Value::from("iris")]).unwrap();
        let get_body = getter.body.as_ref().unwrap();
        assert_eq!(get_body(&mut obj, &[]).unwrap(), Value::from("iris"));
    }

    #[test]
    fn test_accessor_for_inherited_field() {
        let mut registry = ClassRegistry::new();
        let base = ClassBuilder::new("Base")
            .field(FieldDef::new("id", TypeRef::Int))
            .register(&mut registry)
            .unwrap();
        let derived = ClassBuilder::new("Derived")
            .extends(base)
            .property_getter("getId", "id")
            .register(&mut registry)
            .unwrap();

        let def = registry.get(derived).unwrap();
        let getter = def.methods.iter().find(|m| m.name == "getId").unwrap();
        assert_eq!(getter.return_type, TypeRef::Int);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = ClassRegistry::new();
        ClassBuilder::new("Point").register(&mut registry).unwrap();
        let err = ClassBuilder::new("Point").register(&mut registry).unwrap_err();
        assert_eq!(
            err,
            DefineError::DuplicateClass {
                name: "Point".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut registry = ClassRegistry::new();
        let err = ClassBuilder::new("Orphan")
            .extends(ClassId::new(9))
            .register(&mut registry)
            .unwrap_err();
        assert_eq!(err, DefineError::UnknownParent { id: ClassId::new(9) });
    }

    #[test]
    fn test_implements_requires_interface() {
        let mut registry = ClassRegistry::new();
        let base = ClassBuilder::new("Base").register(&mut registry).unwrap();
        let err = ClassBuilder::new("Impl")
            .implements(base)
            .register(&mut registry)
            .unwrap_err();
        assert_eq!(
            err,
            DefineError::NotAnInterface {
                name: "Base".to_string()
            }
        );
    }

    #[test]
    fn test_interface_cannot_declare_instance_fields() {
        let mut registry = ClassRegistry::new();
        let err = ClassBuilder::interface("Shape")
            .field(FieldDef::new("area", TypeRef::Float))
            .register(&mut registry)
            .unwrap_err();
        assert_eq!(
            err,
            DefineError::InterfaceField {
                name: "Shape".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_accessor_field_rejected() {
        let mut registry = ClassRegistry::new();
        let err = ClassBuilder::new("User")
            .property_getter("getName", "name")
            .register(&mut registry)
            .unwrap_err();
        assert_eq!(
            err,
            DefineError::UnknownField {
                class_name: "User".to_string(),
                field: "name".to_string()
            }
        );
    }
}
