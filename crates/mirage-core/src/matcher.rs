//! Argument and method matchers
//!
//! The matcher contract is deliberately small: per-argument predicates are
//! either exact equality or a wildcard. A method matcher tests name
//! equality plus an ordered positional predicate list; an absent list
//! accepts any arguments. Positional predicates ignore a named variadic
//! tail.

use crate::slot::CallArgs;
use crate::value::Value;

/// Predicate over one positional argument
#[derive(Debug, Clone, PartialEq)]
pub enum ArgMatcher {
    /// Accept a value equal to the captured one
    Eq(Value),
    /// Accept anything
    Any,
}

impl ArgMatcher {
    /// Test one argument value
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ArgMatcher::Eq(expected) => expected == value,
            ArgMatcher::Any => true,
        }
    }
}

/// Equality predicate for the given value
pub fn eq(value: impl Into<Value>) -> ArgMatcher {
    ArgMatcher::Eq(value.into())
}

/// Wildcard predicate
pub fn any() -> ArgMatcher {
    ArgMatcher::Any
}

/// Matcher over a full call signature
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: String,
    args: Option<Vec<ArgMatcher>>,
}

impl MethodMatcher {
    /// Create a matcher for `method`; `args` of `None` accepts any arguments
    pub fn new(method: impl Into<String>, args: Option<Vec<ArgMatcher>>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// The matched method name
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Test an invocation.
    ///
    /// With a predicate list present the positional count must match the
    /// list length exactly; extra or missing positional arguments are a
    /// non-match.
    pub fn matches(&self, method: &str, args: &CallArgs) -> bool {
        if self.method != method {
            return false;
        }
        match &self.args {
            None => true,
            Some(predicates) => {
                if predicates.len() != args.positional.len() {
                    return false;
                }
                predicates
                    .iter()
                    .zip(args.positional.iter())
                    .all(|(predicate, slot)| predicate.matches(&slot.get()))
            }
        }
    }
}
