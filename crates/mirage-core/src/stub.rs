//! Stub registry
//!
//! Registered stubs are `(matcher, answer collection)` pairs kept in
//! registration order. Resolution scans most-recent-first, so a later
//! registration with an overlapping matcher shadows an earlier one without
//! removing it; tests can refine behavior mid-test.

use crate::answer::AnswerCollection;
use crate::matcher::MethodMatcher;
use crate::slot::CallArgs;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Maps stub matchers to answer collections
#[derive(Default)]
pub struct StubMapper {
    mappings: Mutex<Vec<(MethodMatcher, Arc<AnswerCollection>)>>,
}

impl StubMapper {
    /// Create an empty mapper
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stub mapping
    pub fn map(&self, matcher: MethodMatcher, answers: Arc<AnswerCollection>) {
        self.mappings.lock().push((matcher, answers));
    }

    /// Resolve the most recently registered mapping accepting the call
    pub fn resolve(&self, method: &str, args: &CallArgs) -> Option<Arc<AnswerCollection>> {
        self.mappings
            .lock()
            .iter()
            .rev()
            .find(|(matcher, _)| matcher.matches(method, args))
            .map(|(_, answers)| Arc::clone(answers))
    }

    /// Number of registered mappings
    pub fn len(&self) -> usize {
        self.mappings.lock().len()
    }

    /// Whether no mappings are registered
    pub fn is_empty(&self) -> bool {
        self.mappings.lock().is_empty()
    }

    /// Remove all registered mappings
    pub fn clear(&self) {
        self.mappings.lock().clear();
    }
}

impl fmt::Debug for StubMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubMapper").field("len", &self.len()).finish()
    }
}
