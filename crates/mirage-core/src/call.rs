//! Recorded calls

use crate::slot::CallArgs;
use crate::value::Value;
use std::fmt;

/// One recorded invocation.
///
/// The argument package keeps the original slots, so by-reference
/// arguments reflect mutations made after recording. Recorded calls are
/// append-only and never mutated by the engine.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Invoked method name
    pub method: String,
    /// Argument package at call time
    pub args: CallArgs,
    /// Monotonic sequence index, shared across recording channels
    pub seq: u64,
}

impl RecordedCall {
    /// Snapshot the current value of the positional argument at `index`
    pub fn arg(&self, index: usize) -> Option<Value> {
        self.args.get(index)
    }

    /// Snapshot all positional argument values
    pub fn arg_values(&self) -> Vec<Value> {
        self.args.snapshot()
    }
}

impl fmt::Display for RecordedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}(", self.seq, self.method)?;
        for (i, value) in self.arg_values().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        for (key, slot) in &self.args.named {
            write!(f, ", {}: {}", key, slot.get())?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let call = RecordedCall {
            method: "add".into(),
            args: CallArgs::from_values(vec![Value::Int(1), Value::Int(2)]),
            seq: 3,
        };
        assert_eq!(format!("{}", call), "#3 add(1, 2)");
    }

    #[test]
    fn test_display_with_named_tail() {
        let mut args = CallArgs::from_values(vec![Value::Int(1)]);
        args.push_named("limit", crate::slot::ArgSlot::value(10));
        let call = RecordedCall {
            method: "page".into(),
            args,
            seq: 0,
        };
        assert_eq!(format!("{}", call), "#0 page(1, limit: 10)");
    }
}
