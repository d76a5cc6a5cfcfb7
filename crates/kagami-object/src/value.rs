//! Runtime values

use crate::instance::Instance;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a heap instance
pub type InstanceRef = Arc<RwLock<Instance>>;

/// A runtime value stored in a field slot or passed to a method
#[derive(Clone)]
pub enum Value {
    /// The null value
    Null,
    /// A boolean
    Bool(bool),
    /// A 64-bit signed integer
    Int(i64),
    /// An IEEE 754 double
    Float(f64),
    /// A string
    Str(String),
    /// A shared object instance
    Object(InstanceRef),
}

impl Value {
    /// Wrap an instance into an object value
    pub fn object(instance: Instance) -> Self {
        Value::Object(Arc::new(RwLock::new(instance)))
    }

    /// Whether this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpret as a boolean, if it is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret as an integer, if it is one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Interpret as a float, if it is one
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Interpret as a string slice, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret as an object handle, if it is one
    pub fn as_object(&self) -> Option<&InstanceRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

// Scalars compare by value, objects by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Object(obj) => {
                write!(f, "<object class_id={}>", obj.read().class_id())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
