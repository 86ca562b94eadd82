//! Argument slots: by-value copies and by-reference bindings
//!
//! Every call argument occupies a slot. A by-value slot is an independent
//! copy; a by-reference slot is a shared, mutable binding to the caller's
//! storage, so mutations a stub callback makes are visible to the original
//! caller. Recorded calls keep the slots themselves, which makes late
//! mutations of referenced arguments visible in call history.

use crate::value::Value;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared storage cell backing a by-reference argument
pub type SharedValue = Arc<Mutex<Value>>;

/// Create a shared storage cell for passing an argument by reference
pub fn shared(value: impl Into<Value>) -> SharedValue {
    Arc::new(Mutex::new(value.into()))
}

/// One argument slot of a call
#[derive(Debug, Clone)]
pub enum ArgSlot {
    /// Independent copy of the argument value
    ByValue(Value),
    /// Shared, mutable binding to the caller's storage
    ByRef(SharedValue),
}

impl ArgSlot {
    /// Create a by-value slot
    pub fn value(value: impl Into<Value>) -> Self {
        ArgSlot::ByValue(value.into())
    }

    /// Create a by-reference slot bound to existing shared storage
    pub fn reference(cell: &SharedValue) -> Self {
        ArgSlot::ByRef(Arc::clone(cell))
    }

    /// Snapshot the current value of the slot
    pub fn get(&self) -> Value {
        match self {
            ArgSlot::ByValue(v) => v.clone(),
            ArgSlot::ByRef(cell) => cell.lock().clone(),
        }
    }

    /// Write a value into the slot.
    ///
    /// For a by-reference slot the write is visible to the caller; for a
    /// by-value slot only this copy changes.
    pub fn set(&mut self, value: Value) {
        match self {
            ArgSlot::ByValue(v) => *v = value,
            ArgSlot::ByRef(cell) => *cell.lock() = value,
        }
    }

    /// Whether this slot shares storage with the caller
    pub fn is_reference(&self) -> bool {
        matches!(self, ArgSlot::ByRef(_))
    }
}

/// The full argument package of one call: positional slots plus a named
/// (by-key) variadic tail.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    /// Positional argument slots, in call order
    pub positional: Vec<ArgSlot>,
    /// Named variadic tail entries, in call order
    pub named: Vec<(String, ArgSlot)>,
}

impl CallArgs {
    /// Create an empty argument package
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a package of by-value positional arguments
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            positional: values.into_iter().map(ArgSlot::ByValue).collect(),
            named: Vec::new(),
        }
    }

    /// Append a positional slot
    pub fn push(&mut self, slot: ArgSlot) {
        self.positional.push(slot);
    }

    /// Append a named tail entry
    pub fn push_named(&mut self, key: impl Into<String>, slot: ArgSlot) {
        self.named.push((key.into(), slot));
    }

    /// Number of positional arguments
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// Whether there are no arguments at all
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Snapshot the current value of the positional argument at `index`
    pub fn get(&self, index: usize) -> Option<Value> {
        self.positional.get(index).map(ArgSlot::get)
    }

    /// Snapshot the current value of a named tail entry
    pub fn get_named(&self, key: &str) -> Option<Value> {
        self.named
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, slot)| slot.get())
    }

    /// Snapshot all positional values in order
    pub fn snapshot(&self) -> Vec<Value> {
        self.positional.iter().map(ArgSlot::get).collect()
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(values: Vec<Value>) -> Self {
        CallArgs::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_value_slots_are_independent() {
        let mut args = CallArgs::from_values(vec![Value::Int(1)]);
        let original = args.positional[0].clone();
        args.positional[0].set(Value::Int(99));
        assert_eq!(original.get(), Value::Int(1));
        assert_eq!(args.get(0), Some(Value::Int(99)));
    }

    #[test]
    fn test_by_ref_slots_share_storage() {
        let cell = shared(Value::Int(1));
        let mut args = CallArgs::new();
        args.push(ArgSlot::reference(&cell));

        args.positional[0].set(Value::Int(42));
        assert_eq!(*cell.lock(), Value::Int(42));

        // Writing through the caller's cell is visible in the slot too
        *cell.lock() = Value::Str("late".into());
        assert_eq!(args.get(0), Some(Value::Str("late".into())));
    }

    #[test]
    fn test_named_tail() {
        let mut args = CallArgs::new();
        args.push(ArgSlot::value(1));
        args.push_named("limit", ArgSlot::value(10));

        assert_eq!(args.len(), 1);
        assert!(!args.is_empty());
        assert_eq!(args.get_named("limit"), Some(Value::Int(10)));
        assert_eq!(args.get_named("offset"), None);
    }

    #[test]
    fn test_snapshot_order() {
        let args = CallArgs::from_values(vec![Value::Int(1), Value::Str("b".into())]);
        assert_eq!(args.snapshot(), vec![Value::Int(1), Value::Str("b".into())]);
    }
}
