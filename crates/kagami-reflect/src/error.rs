//! Reflection errors

use kagami_object::ClassId;
use std::fmt;
use thiserror::Error;

/// Which side of a property an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// A read accessor
    Getter,
    /// A write accessor
    Setter,
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessorKind::Getter => write!(f, "getter"),
            AccessorKind::Setter => write!(f, "setter"),
        }
    }
}

/// Errors raised while building a descriptor or accessing a property
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReflectError {
    /// Overloaded accessors for one property could not be disambiguated.
    /// Fatal to descriptor construction; nothing is cached for the class.
    #[error("illegal overloaded {kind} with ambiguous type for property '{property}' in class '{class_name}'")]
    AmbiguousAccessor {
        /// Getter or setter
        kind: AccessorKind,
        /// The conflicted property name
        property: String,
        /// The class declaring the first conflicting candidate
        class_name: String,
    },

    /// The requested property has no accessor of the requested kind
    #[error("there is no {kind} for property '{property}' in class '{class_name}'")]
    NoSuchAccessor {
        /// Getter or setter
        kind: AccessorKind,
        /// The requested property name
        property: String,
        /// The described class
        class_name: String,
    },

    /// The class exposes no usable zero-argument constructor
    #[error("there is no default constructor for class '{class_name}'")]
    NoDefaultConstructor {
        /// The described class
        class_name: String,
    },

    /// An underlying read, write, or invocation failed; wraps the cause
    #[error("failed to access '{member}' on class '{class_name}': {cause}")]
    Access {
        /// The method or field that failed
        member: String,
        /// The class declaring the member
        class_name: String,
        /// The original failure
        cause: String,
    },

    /// The class ID is not present in the registry
    #[error("unknown class: {id}")]
    UnknownClass {
        /// The missing ID
        id: ClassId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_property() {
        let err = ReflectError::NoSuchAccessor {
            kind: AccessorKind::Setter,
            property: "age".to_string(),
            class_name: "User".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "there is no setter for property 'age' in class 'User'"
        );
    }

    #[test]
    fn test_access_error_carries_cause() {
        let err = ReflectError::Access {
            member: "getName".to_string(),
            class_name: "User".to_string(),
            cause: "field slot 3 out of bounds".to_string(),
        };
        assert!(err.to_string().contains("field slot 3 out of bounds"));
    }
}
