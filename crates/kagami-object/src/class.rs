//! Class, method, field, and constructor metadata

use crate::instance::Instance;
use crate::types::{ClassId, TypeRef};
use crate::value::Value;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Kind of a registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// A concrete or abstract class
    Class,
    /// An interface (no instance fields, bodiless methods allowed)
    Interface,
}

/// Declared visibility of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Accessible from anywhere
    Public,
    /// Accessible from the class and its subclasses
    Protected,
    /// Accessible from the declaring class only
    Private,
}

/// Callable body of a method
///
/// Receives the target instance and the argument list. Failures are reported
/// as plain string causes; the reflection layer wraps them into typed errors.
pub type MethodFn = Arc<dyn Fn(&mut Instance, &[Value]) -> Result<Value, String> + Send + Sync>;

/// Callable body of a constructor
pub type CtorFn = Arc<dyn Fn(&ClassDef, &[Value]) -> Result<Instance, String> + Send + Sync>;

/// Declared method metadata
#[derive(Clone)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Ordered parameter types
    pub params: Vec<TypeRef>,
    /// Declared return type
    pub return_type: TypeRef,
    /// Declared visibility
    pub visibility: Visibility,
    /// Whether this is a compiler-synthesized forwarding method
    pub is_bridge: bool,
    /// Implementation (None for interface declarations)
    pub body: Option<MethodFn>,
}

impl MethodDef {
    /// Create a method definition with the given signature
    pub fn new(name: impl Into<String>, params: Vec<TypeRef>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            visibility: Visibility::Public,
            is_bridge: false,
            body: None,
        }
    }

    /// Set the visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as a synthesized forwarding method
    pub fn as_bridge(mut self) -> Self {
        self.is_bridge = true;
        self
    }

    /// Attach an implementation
    pub fn with_body(
        mut self,
        body: impl Fn(&mut Instance, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.body = Some(Arc::new(body));
        self
    }

    /// A zero-parameter method reading an instance field slot
    pub fn slot_getter(name: impl Into<String>, slot: usize, ty: TypeRef) -> Self {
        Self::new(name, Vec::new(), ty).with_body(move |obj, _args| {
            obj.get_field(slot)
                .ok_or_else(|| format!("field slot {} out of bounds", slot))
        })
    }

    /// A one-parameter method writing an instance field slot
    pub fn slot_setter(name: impl Into<String>, slot: usize, ty: TypeRef) -> Self {
        Self::new(name, vec![ty], TypeRef::Void).with_body(move |obj, args| {
            let value = args
                .first()
                .cloned()
                .ok_or_else(|| "missing argument".to_string())?;
            obj.set_field(slot, value)?;
            Ok(Value::Null)
        })
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .field("visibility", &self.visibility)
            .field("is_bridge", &self.is_bridge)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Declared field metadata
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Declared visibility
    pub visibility: Visibility,
    /// Whether the field is class-level
    pub is_static: bool,
    /// Whether the field may not be reassigned
    pub is_final: bool,
    /// Initial value for static storage
    pub initial: Option<Value>,
    /// Storage slot, assigned at registration
    pub(crate) slot: usize,
}

impl FieldDef {
    /// Create a public instance field
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
            initial: None,
            slot: 0,
        }
    }

    /// Set the visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as a class-level field
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as non-reassignable
    pub fn as_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Set the initial value
    pub fn with_initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    /// Assigned storage slot (instance slot, or index into static storage)
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Declared constructor metadata
#[derive(Clone)]
pub struct ConstructorDef {
    /// Ordered parameter types
    pub params: Vec<TypeRef>,
    /// Declared visibility
    pub visibility: Visibility,
    /// Implementation
    pub body: CtorFn,
}

impl ConstructorDef {
    /// Create a constructor definition with a custom body
    pub fn new(
        params: Vec<TypeRef>,
        body: impl Fn(&ClassDef, &[Value]) -> Result<Instance, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            params,
            visibility: Visibility::Public,
            body: Arc::new(body),
        }
    }

    /// A zero-argument constructor producing a null-initialized instance
    pub fn zero_arg() -> Self {
        Self::new(Vec::new(), |class, _args| Ok(class.new_instance()))
    }

    /// Set the visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDef")
            .field("params", &self.params)
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// A registered class or interface definition
///
/// Immutable after registration except for static field storage, which sits
/// behind per-slot locks so shared definitions stay `Sync`.
#[derive(Debug)]
pub struct ClassDef {
    /// Class ID (assigned by the registry)
    pub id: ClassId,
    /// Class name (unique within a registry)
    pub name: String,
    /// Class or interface
    pub kind: ClassKind,
    /// Parent class (None for root classes)
    pub parent: Option<ClassId>,
    /// Directly implemented (or extended, for interfaces) interfaces
    pub interfaces: Vec<ClassId>,
    /// Declared methods, in declaration order
    pub methods: Vec<MethodDef>,
    /// Declared fields, in declaration order
    pub fields: Vec<FieldDef>,
    /// Declared constructors
    pub constructors: Vec<ConstructorDef>,
    /// Total instance slots including inherited fields
    pub slot_count: usize,
    /// Static field storage, indexed by static slot
    pub statics: Vec<RwLock<Value>>,
}

impl ClassDef {
    /// Create a null-initialized instance of this class
    pub fn new_instance(&self) -> Instance {
        Instance::new(self.id, self.slot_count)
    }

    /// Read a static field slot
    pub fn get_static(&self, slot: usize) -> Option<Value> {
        self.statics.get(slot).map(|cell| cell.read().clone())
    }

    /// Write a static field slot
    pub fn set_static(&self, slot: usize, value: Value) -> Result<(), String> {
        match self.statics.get(slot) {
            Some(cell) => {
                *cell.write() = value;
                Ok(())
            }
            None => Err(format!(
                "static slot {} out of bounds (class '{}' has {} static slots)",
                slot,
                self.name,
                self.statics.len()
            )),
        }
    }

    /// Find a declared field by name
    pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_class(name: &str, slot_count: usize) -> ClassDef {
        ClassDef {
            id: ClassId::new(0),
            name: name.to_string(),
            kind: ClassKind::Class,
            parent: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            slot_count,
            statics: Vec::new(),
        }
    }

    #[test]
    fn test_slot_getter_reads_field() {
        let getter = MethodDef::slot_getter("getAge", 0, TypeRef::Int);
        let mut obj = Instance::new(ClassId::new(0), 1);
        obj.set_field(0, Value::Int(30)).unwrap();

        let body = getter.body.as_ref().unwrap();
        assert_eq!(body(&mut obj, &[]).unwrap(), Value::Int(30));
    }

    #[test]
    fn test_slot_setter_writes_field() {
        let setter = MethodDef::slot_setter("setAge", 0, TypeRef::Int);
        let mut obj = Instance::new(ClassId::new(0), 1);

        let body = setter.body.as_ref().unwrap();
        body(&mut obj, &[Value::Int(18)]).unwrap();
        assert_eq!(obj.get_field(0), Some(Value::Int(18)));
    }

    #[test]
    fn test_slot_setter_requires_argument() {
        let setter = MethodDef::slot_setter("setAge", 0, TypeRef::Int);
        let mut obj = Instance::new(ClassId::new(0), 1);

        let body = setter.body.as_ref().unwrap();
        assert!(body(&mut obj, &[]).is_err());
    }

    #[test]
    fn test_zero_arg_constructor() {
        let class = empty_class("Point", 2);
        let ctor = ConstructorDef::zero_arg();
        let obj = (ctor.body)(&class, &[]).unwrap();
        assert_eq!(obj.slot_count(), 2);
        assert_eq!(obj.get_field(0), Some(Value::Null));
    }

    #[test]
    fn test_static_storage() {
        let mut class = empty_class("Counter", 0);
        class.statics.push(RwLock::new(Value::Int(0)));

        assert_eq!(class.get_static(0), Some(Value::Int(0)));
        class.set_static(0, Value::Int(5)).unwrap();
        assert_eq!(class.get_static(0), Some(Value::Int(5)));
        assert!(class.set_static(3, Value::Null).is_err());
    }
}
