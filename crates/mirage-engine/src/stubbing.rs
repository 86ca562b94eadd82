//! Stubbing and verification builders
//!
//! `when`-style stubbing: the first `then_*` call creates and registers
//! the answer collection; later `then_*` calls on the same builder append
//! to it, forming an in-order answer sequence.
//!
//! `verify`-style verification queries the recorded history with the same
//! matcher contract stubs use.

use mirage_core::{
    any, AnswerCollection, ArgMatcher, CallArgs, ConstAnswer, FnAnswer, MethodMatcher, MockInfo,
    ParentAnswer, RaiseAnswer, RecordedCall, Value,
};
use mirage_types::{MockError, MockResult};
use std::sync::Arc;

/// Registers stub mappings for one method of one mock
pub struct StubBuilder {
    info: Arc<MockInfo>,
    method: String,
    matchers: Option<Vec<ArgMatcher>>,
    collection: Option<Arc<AnswerCollection>>,
}

impl StubBuilder {
    /// Create a builder for `method`; without `with_args` the stub
    /// accepts any arguments.
    pub fn new(info: Arc<MockInfo>, method: impl Into<String>) -> Self {
        Self {
            info,
            method: method.into(),
            matchers: None,
            collection: None,
        }
    }

    /// Constrain the stub to the given positional argument predicates
    pub fn with_args(mut self, matchers: Vec<ArgMatcher>) -> Self {
        self.matchers = Some(matchers);
        self
    }

    /// Constrain the stub to calls with no positional arguments
    pub fn with_no_args(self) -> Self {
        self.with_args(Vec::new())
    }

    /// Shorthand: one wildcard predicate per parameter count
    pub fn with_any_args(self, count: usize) -> Self {
        self.with_args((0..count).map(|_| any()).collect())
    }

    fn push(&mut self, answer: Arc<dyn mirage_core::Answer>) {
        match &self.collection {
            Some(collection) => collection.push(answer),
            None => {
                let collection = Arc::new(AnswerCollection::new(answer));
                self.info.stubs().map(
                    MethodMatcher::new(self.method.clone(), self.matchers.clone()),
                    Arc::clone(&collection),
                );
                self.collection = Some(collection);
            }
        }
    }

    /// Answer matched calls with a constant value
    pub fn then_return(mut self, value: impl Into<Value>) -> Self {
        self.push(Arc::new(ConstAnswer::new(value)));
        self
    }

    /// Answer matched calls by running a callback
    pub fn then_answer<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &mut CallArgs) -> MockResult<Value> + Send + Sync + 'static,
    {
        self.push(Arc::new(FnAnswer::new(callback)));
        self
    }

    /// Raise an error on matched calls
    pub fn then_raise(mut self, message: impl Into<String>) -> Self {
        self.push(Arc::new(RaiseAnswer::message(message)));
        self
    }

    /// Raise a specific error on matched calls
    pub fn then_raise_error(mut self, error: MockError) -> Self {
        self.push(Arc::new(RaiseAnswer::new(error)));
        self
    }

    /// Delegate matched calls to the real ancestor implementation
    pub fn then_call_parent(mut self) -> Self {
        self.push(Arc::new(ParentAnswer));
        self
    }
}

/// Queries the recorded history of one method
pub struct CallVerifier {
    info: Arc<MockInfo>,
    method: String,
    matchers: Option<Vec<ArgMatcher>>,
}

impl CallVerifier {
    /// Create a verifier for `method`; without `with_args` every call to
    /// the method matches.
    pub fn new(info: Arc<MockInfo>, method: impl Into<String>) -> Self {
        Self {
            info,
            method: method.into(),
            matchers: None,
        }
    }

    /// Constrain matching to the given positional argument predicates
    pub fn with_args(mut self, matchers: Vec<ArgMatcher>) -> Self {
        self.matchers = Some(matchers);
        self
    }

    fn matcher(&self) -> MethodMatcher {
        MethodMatcher::new(self.method.clone(), self.matchers.clone())
    }

    /// The matching calls from the primary history channel, in order
    pub fn matching_calls(&self) -> Vec<RecordedCall> {
        let matcher = self.matcher();
        self.info
            .recorder()
            .history()
            .into_iter()
            .filter(|call| matcher.matches(&call.method, &call.args))
            .collect()
    }

    /// The matching calls from the dynamic-call channel, in order
    pub fn matching_dynamic_calls(&self) -> Vec<RecordedCall> {
        let matcher = self.matcher();
        self.info
            .recorder()
            .dynamic_history()
            .into_iter()
            .filter(|call| matcher.matches(&call.method, &call.args))
            .collect()
    }

    /// Expect exactly `n` matching calls
    pub fn times(&self, n: usize) -> MockResult<Vec<RecordedCall>> {
        let calls = self.matching_calls();
        if calls.len() == n {
            Ok(calls)
        } else {
            Err(MockError::VerificationFailed {
                method: self.method.clone(),
                expected: format!("exactly {}", n),
                actual: calls.len(),
            })
        }
    }

    /// Expect exactly one matching call
    pub fn once(&self) -> MockResult<Vec<RecordedCall>> {
        self.times(1)
    }

    /// Expect no matching calls
    pub fn never(&self) -> MockResult<()> {
        let calls = self.matching_calls();
        if calls.is_empty() {
            Ok(())
        } else {
            Err(MockError::VerificationFailed {
                method: self.method.clone(),
                expected: "no".to_string(),
                actual: calls.len(),
            })
        }
    }

    /// Expect at least `n` matching calls
    pub fn at_least(&self, n: usize) -> MockResult<Vec<RecordedCall>> {
        let calls = self.matching_calls();
        if calls.len() >= n {
            Ok(calls)
        } else {
            Err(MockError::VerificationFailed {
                method: self.method.clone(),
                expected: format!("at least {}", n),
                actual: calls.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirage_core::{eq, NullAnswer, Recorder, StubMapper};

    fn make_info() -> Arc<MockInfo> {
        MockInfo::new(
            "Base",
            Arc::new(Recorder::new()),
            Arc::new(StubMapper::new()),
            Arc::new(NullAnswer),
        )
    }

    fn run(info: &Arc<MockInfo>, method: &str, values: Vec<Value>) -> MockResult<Value> {
        let mut args = CallArgs::from_values(values);
        let resolved = info.invoke_chain(method, &args)?;
        let answer = resolved.current();
        let result = answer.resolve(method, &mut args);
        resolved.commit();
        result
    }

    #[test]
    fn test_builder_registers_one_collection_per_chain() {
        let info = make_info();
        let before = info.stubs().len();
        let _ = StubBuilder::new(Arc::clone(&info), "fetch")
            .then_return(1)
            .then_return(2)
            .then_return(3);
        assert_eq!(info.stubs().len(), before + 1);

        assert_eq!(run(&info, "fetch", vec![]).unwrap(), Value::Int(1));
        assert_eq!(run(&info, "fetch", vec![]).unwrap(), Value::Int(2));
        assert_eq!(run(&info, "fetch", vec![]).unwrap(), Value::Int(3));
        assert_eq!(run(&info, "fetch", vec![]).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_verifier_counts() {
        let info = make_info();
        run(&info, "add", vec![Value::Int(1), Value::Int(2)]).unwrap();
        run(&info, "add", vec![Value::Int(3), Value::Int(4)]).unwrap();

        let verifier = CallVerifier::new(Arc::clone(&info), "add");
        assert_eq!(verifier.times(2).unwrap().len(), 2);
        assert!(verifier.once().is_err());

        let exact = CallVerifier::new(Arc::clone(&info), "add").with_args(vec![eq(1), eq(2)]);
        exact.once().unwrap();

        CallVerifier::new(Arc::clone(&info), "sub").never().unwrap();
        assert!(CallVerifier::new(info, "add").never().is_err());
    }

    #[test]
    fn test_verification_failure_error() {
        let info = make_info();
        let err = CallVerifier::new(info, "add").once().unwrap_err();
        assert_eq!(
            err,
            MockError::VerificationFailed {
                method: "add".into(),
                expected: "exactly 1".into(),
                actual: 0,
            }
        );
    }
}
