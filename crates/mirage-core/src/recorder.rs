//! Append-only call recorder
//!
//! The recorder owns two channels: the primary channel every intercepted
//! call lands in, and a secondary dynamic-call channel for calls that
//! arrived through a target's name-based dynamic dispatch entry. Both
//! channels share one sequence counter, so interleaving is reconstructable.

use crate::call::RecordedCall;
use crate::slot::CallArgs;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Append-only recorder of intercepted calls
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<RecordedCall>>,
    dynamic_calls: Mutex<Vec<RecordedCall>>,
    seq: AtomicU64,
}

impl Recorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call to the primary channel
    pub fn append(&self, method: &str, args: CallArgs) {
        let call = self.make_call(method, args);
        self.calls.lock().push(call);
    }

    /// Append a call to the secondary dynamic-call channel
    pub fn append_dynamic(&self, method: &str, args: CallArgs) {
        let call = self.make_call(method, args);
        self.dynamic_calls.lock().push(call);
    }

    fn make_call(&self, method: &str, args: CallArgs) -> RecordedCall {
        RecordedCall {
            method: method.to_string(),
            args,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Ordered history of the primary channel
    pub fn history(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Ordered history of the dynamic-call channel
    pub fn dynamic_history(&self) -> Vec<RecordedCall> {
        self.dynamic_calls.lock().clone()
    }

    /// Number of recorded primary-channel calls to `method`
    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    /// Drop all recorded calls from both channels
    pub fn clear(&self) {
        self.calls.lock().clear();
        self.dynamic_calls.lock().clear();
    }
}
