//! Kagami Property Reflection
//!
//! Builds cached property descriptors ([`Reflector`]) for classes registered
//! in a [`kagami_object::ClassRegistry`]. A descriptor maps logical property
//! names to uniform read/write handles ([`Invoker`]), resolving accessor
//! methods across the inheritance chain and falling back to direct field
//! access where no accessor exists.
//!
//! ## Usage
//!
//! ```
//! use kagami_object::{ClassBuilder, ClassRegistry, FieldDef, TypeRef, Value};
//! use kagami_reflect::ReflectorCache;
//!
//! let mut registry = ClassRegistry::new();
//! let user = ClassBuilder::new("User")
//!     .field(FieldDef::new("name", TypeRef::Str))
//!     .property_getter("getName", "name")
//!     .property_setter("setName", "name")
//!     .register(&mut registry)
//!     .unwrap();
//!
//! let cache = ReflectorCache::new();
//! let reflector = cache.describe(&registry, user).unwrap();
//! assert!(reflector.has_getter("name"));
//!
//! let mut obj = registry.get(user).unwrap().new_instance();
//! reflector.set(&mut obj, "name", Value::from("iris")).unwrap();
//! assert_eq!(reflector.get(&mut obj, "name").unwrap(), Value::from("iris"));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod error;
pub mod invoker;
pub mod property;
pub mod reflector;

pub use cache::{describe, ReflectorCache};
pub use error::{AccessorKind, ReflectError};
pub use invoker::{ConstructorHandle, FieldHandle, Invoker, MethodHandle};
pub use reflector::Reflector;
