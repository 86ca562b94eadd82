//! Programmable answers and in-order answer collections
//!
//! An answer resolves one intercepted call to a value (or an error). The
//! parent-delegate answer is a marker: dispatch detects it and invokes the
//! real ancestor implementation instead of any callback.
//!
//! Stub registrations hold an [`AnswerCollection`]: an ordered list of
//! answers with a cursor advanced exactly once per resolved call. The
//! final entry repeats once the collection is exhausted.

use crate::slot::CallArgs;
use crate::value::Value;
use mirage_types::{MockError, MockResult};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// A programmable outcome for one intercepted call
pub trait Answer: Send + Sync {
    /// Produce the value for one invocation.
    ///
    /// The argument package is mutable so callbacks can write through
    /// by-reference slots.
    fn resolve(&self, method: &str, args: &mut CallArgs) -> MockResult<Value>;

    /// Whether dispatch must bypass this answer and call the real
    /// ancestor implementation of the invoked method.
    fn is_parent_delegate(&self) -> bool {
        false
    }
}

/// The no-answer default: every call resolves to null
#[derive(Debug, Default)]
pub struct NullAnswer;

impl Answer for NullAnswer {
    fn resolve(&self, _method: &str, _args: &mut CallArgs) -> MockResult<Value> {
        Ok(Value::Null)
    }
}

/// A constant value answer
#[derive(Debug)]
pub struct ConstAnswer(Value);

impl ConstAnswer {
    /// Answer every matched call with `value`
    pub fn new(value: impl Into<Value>) -> Self {
        ConstAnswer(value.into())
    }
}

impl Answer for ConstAnswer {
    fn resolve(&self, _method: &str, _args: &mut CallArgs) -> MockResult<Value> {
        Ok(self.0.clone())
    }
}

/// Callback signature for [`FnAnswer`]
pub type AnswerFn = dyn Fn(&str, &mut CallArgs) -> MockResult<Value> + Send + Sync;

/// A callback answer
pub struct FnAnswer(Box<AnswerFn>);

impl FnAnswer {
    /// Answer matched calls by running `callback`
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str, &mut CallArgs) -> MockResult<Value> + Send + Sync + 'static,
    {
        FnAnswer(Box::new(callback))
    }
}

impl Answer for FnAnswer {
    fn resolve(&self, method: &str, args: &mut CallArgs) -> MockResult<Value> {
        (self.0)(method, args)
    }
}

impl fmt::Debug for FnAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAnswer").finish_non_exhaustive()
    }
}

/// An answer that raises a programmed error
#[derive(Debug)]
pub struct RaiseAnswer(MockError);

impl RaiseAnswer {
    /// Raise `error` on every matched call
    pub fn new(error: MockError) -> Self {
        RaiseAnswer(error)
    }

    /// Raise a [`MockError::Raised`] with the given message
    pub fn message(message: impl Into<String>) -> Self {
        RaiseAnswer(MockError::Raised(message.into()))
    }
}

impl Answer for RaiseAnswer {
    fn resolve(&self, _method: &str, _args: &mut CallArgs) -> MockResult<Value> {
        Err(self.0.clone())
    }
}

/// Marker answer delegating to the real ancestor implementation.
///
/// Dispatch checks [`Answer::is_parent_delegate`] before running the
/// answer; `resolve` is only reached when no real implementation is
/// available (interface-declared methods), in which case the call yields
/// null.
#[derive(Debug, Default)]
pub struct ParentAnswer;

impl Answer for ParentAnswer {
    fn resolve(&self, _method: &str, _args: &mut CallArgs) -> MockResult<Value> {
        Ok(Value::Null)
    }

    fn is_parent_delegate(&self) -> bool {
        true
    }
}

/// Ordered answers with an in-order cursor.
///
/// The cursor is advanced by [`AnswerCollection::commit`], called exactly
/// once per resolved call after the value (or error) is produced. Once
/// the cursor reaches the final entry it stays there.
pub struct AnswerCollection {
    answers: Mutex<Vec<Arc<dyn Answer>>>,
    cursor: Mutex<usize>,
}

impl AnswerCollection {
    /// Create a collection with its first answer
    pub fn new(first: Arc<dyn Answer>) -> Self {
        Self {
            answers: Mutex::new(vec![first]),
            cursor: Mutex::new(0),
        }
    }

    /// Append a follow-up answer
    pub fn push(&self, answer: Arc<dyn Answer>) {
        self.answers.lock().push(answer);
    }

    /// The answer the cursor currently points at
    pub fn current(&self) -> Arc<dyn Answer> {
        let answers = self.answers.lock();
        let cursor = *self.cursor.lock();
        let index = cursor.min(answers.len() - 1);
        Arc::clone(&answers[index])
    }

    /// Advance the cursor one step, clamping at the final entry
    pub fn commit(&self) {
        let len = self.answers.lock().len();
        let mut cursor = self.cursor.lock();
        *cursor = (*cursor + 1).min(len - 1);
    }

    /// Number of answers in the collection
    pub fn len(&self) -> usize {
        self.answers.lock().len()
    }

    /// Whether the collection is empty (never true: one answer is required)
    pub fn is_empty(&self) -> bool {
        self.answers.lock().is_empty()
    }
}

impl fmt::Debug for AnswerCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerCollection")
            .field("len", &self.len())
            .field("cursor", &*self.cursor.lock())
            .finish()
    }
}
