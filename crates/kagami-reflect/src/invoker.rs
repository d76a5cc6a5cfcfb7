//! Uniform property access handles
//!
//! An [`Invoker`] is the single abstraction the descriptor hands out for
//! reading or writing one property, regardless of whether the property is
//! physically backed by an accessor method or by a field slot.

use crate::error::ReflectError;
use kagami_object::{ClassDef, ConstructorDef, FieldDef, Instance, MethodDef, MethodFn, TypeRef, Value};
use std::fmt;
use std::sync::Arc;

/// A bound accessor method
#[derive(Clone)]
pub struct MethodHandle {
    class_name: String,
    name: String,
    value_type: TypeRef,
    body: Option<MethodFn>,
}

impl MethodHandle {
    /// Bind a declared method
    ///
    /// The handle's value type is the single parameter type for one-parameter
    /// methods (setters), the declared return type otherwise.
    pub fn new(declaring: &ClassDef, def: &MethodDef) -> Self {
        let value_type = if def.params.len() == 1 {
            def.params[0]
        } else {
            def.return_type
        };
        Self {
            class_name: declaring.name.clone(),
            name: def.name.clone(),
            value_type,
            body: def.body.clone(),
        }
    }

    /// The bound method's name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, target: &mut Instance, args: &[Value]) -> Result<Value, ReflectError> {
        let body = self.body.as_ref().ok_or_else(|| ReflectError::Access {
            member: self.name.clone(),
            class_name: self.class_name.clone(),
            cause: "method has no implementation".to_string(),
        })?;
        body(target, args).map_err(|cause| ReflectError::Access {
            member: self.name.clone(),
            class_name: self.class_name.clone(),
            cause,
        })
    }
}

impl fmt::Debug for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandle")
            .field("class_name", &self.class_name)
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .finish()
    }
}

#[derive(Debug, Clone)]
enum FieldStorage {
    /// A slot in the target instance
    Instance { slot: usize },
    /// A slot in the declaring class's static storage
    Static { class: Arc<ClassDef>, slot: usize },
}

/// A bound field slot
#[derive(Debug, Clone)]
pub struct FieldHandle {
    class_name: String,
    name: String,
    ty: TypeRef,
    storage: FieldStorage,
}

impl FieldHandle {
    /// Bind a declared field
    pub fn new(declaring: &Arc<ClassDef>, def: &FieldDef) -> Self {
        let storage = if def.is_static {
            FieldStorage::Static {
                class: Arc::clone(declaring),
                slot: def.slot(),
            }
        } else {
            FieldStorage::Instance { slot: def.slot() }
        };
        Self {
            class_name: declaring.name.clone(),
            name: def.name.clone(),
            ty: def.ty,
            storage,
        }
    }

    /// The bound field's name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, target: &Instance) -> Result<Value, ReflectError> {
        let value = match &self.storage {
            FieldStorage::Instance { slot } => target.get_field(*slot),
            FieldStorage::Static { class, slot } => class.get_static(*slot),
        };
        value.ok_or_else(|| self.access_error("storage slot out of bounds".to_string()))
    }

    fn write(&self, target: &mut Instance, args: &[Value]) -> Result<Value, ReflectError> {
        let value = args
            .first()
            .cloned()
            .ok_or_else(|| self.access_error("missing argument".to_string()))?;
        let result = match &self.storage {
            FieldStorage::Instance { slot } => target.set_field(*slot, value),
            FieldStorage::Static { class, slot } => class.set_static(*slot, value),
        };
        result.map_err(|cause| self.access_error(cause))?;
        Ok(Value::Null)
    }

    fn access_error(&self, cause: String) -> ReflectError {
        ReflectError::Access {
            member: self.name.clone(),
            class_name: self.class_name.clone(),
            cause,
        }
    }
}

/// Uniform handle for one property access direction
///
/// Method-backed and field-backed accessors expose the same invocation
/// surface; failures from the underlying call or slot access are wrapped in
/// [`ReflectError::Access`].
#[derive(Debug, Clone)]
pub enum Invoker {
    /// Accessor method call
    Method(MethodHandle),
    /// Direct field read
    FieldGet(FieldHandle),
    /// Direct field write
    FieldSet(FieldHandle),
}

impl Invoker {
    /// Invoke against a target instance
    ///
    /// Getters take no arguments and return the property value; setters take
    /// the value as the single argument and return null.
    pub fn invoke(&self, target: &mut Instance, args: &[Value]) -> Result<Value, ReflectError> {
        match self {
            Invoker::Method(method) => method.invoke(target, args),
            Invoker::FieldGet(field) => field.read(target),
            Invoker::FieldSet(field) => field.write(target, args),
        }
    }

    /// The declared value type, fixed at construction
    pub fn value_type(&self) -> TypeRef {
        match self {
            Invoker::Method(method) => method.value_type,
            Invoker::FieldGet(field) | Invoker::FieldSet(field) => field.ty,
        }
    }
}

/// A bound zero-argument constructor
#[derive(Clone)]
pub struct ConstructorHandle {
    class: Arc<ClassDef>,
    ctor: ConstructorDef,
}

impl ConstructorHandle {
    pub(crate) fn new(class: Arc<ClassDef>, ctor: ConstructorDef) -> Self {
        Self { class, ctor }
    }

    /// Create a new instance of the bound class
    pub fn instantiate(&self) -> Result<Instance, ReflectError> {
        (self.ctor.body)(&self.class, &[]).map_err(|cause| ReflectError::Access {
            member: "<init>".to_string(),
            class_name: self.class.name.clone(),
            cause,
        })
    }
}

impl fmt::Debug for ConstructorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorHandle")
            .field("class_name", &self.class.name)
            .finish()
    }
}
