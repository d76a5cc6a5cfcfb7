//! Object instances with slot-based field storage

use crate::types::ClassId;
use crate::value::Value;

/// An instance of a registered class
///
/// Fields are stored in a flat slot vector covering the whole inheritance
/// chain; slot indices are assigned at class registration time.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class_id: ClassId,
    fields: Vec<Value>,
}

impl Instance {
    /// Create an instance with all slots initialized to null
    pub fn new(class_id: ClassId, slot_count: usize) -> Self {
        Self {
            class_id,
            fields: vec![Value::Null; slot_count],
        }
    }

    /// The class this instance belongs to
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    /// Read a field slot
    pub fn get_field(&self, slot: usize) -> Option<Value> {
        self.fields.get(slot).cloned()
    }

    /// Write a field slot
    pub fn set_field(&mut self, slot: usize, value: Value) -> Result<(), String> {
        if slot < self.fields.len() {
            self.fields[slot] = value;
            Ok(())
        } else {
            Err(format!(
                "field slot {} out of bounds (instance has {} slots)",
                slot,
                self.fields.len()
            ))
        }
    }

    /// Number of field slots
    pub fn slot_count(&self) -> usize {
        self.fields.len()
    }
}
