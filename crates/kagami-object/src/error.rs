//! Class definition errors

use crate::types::ClassId;
use thiserror::Error;

/// Errors raised while registering a class definition
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefineError {
    /// A class with this name is already registered
    #[error("duplicate class name: {name}")]
    DuplicateClass {
        /// The conflicting name
        name: String,
    },

    /// The parent class ID is not registered
    #[error("unknown parent class: {id}")]
    UnknownParent {
        /// The missing ID
        id: ClassId,
    },

    /// The referenced interface ID is not registered
    #[error("unknown interface: {id}")]
    UnknownInterface {
        /// The missing ID
        id: ClassId,
    },

    /// The `extends` target is not a class
    #[error("class '{name}' cannot extend a non-class type")]
    ParentNotAClass {
        /// The defining class
        name: String,
    },

    /// The `implements` target is not an interface
    #[error("'{name}' is not an interface")]
    NotAnInterface {
        /// Name of the non-interface target
        name: String,
    },

    /// Interfaces cannot declare instance fields
    #[error("interface '{name}' cannot declare instance fields")]
    InterfaceField {
        /// The defining interface
        name: String,
    },

    /// Interfaces cannot extend a class
    #[error("interface '{name}' cannot have a superclass")]
    InterfaceWithParent {
        /// The defining interface
        name: String,
    },

    /// Accessor wiring referenced an unknown instance field
    #[error("class '{class_name}' has no instance field named '{field}'")]
    UnknownField {
        /// The defining class
        class_name: String,
        /// The missing field name
        field: String,
    },
}
