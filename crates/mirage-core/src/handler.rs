//! The invocation handler chain
//!
//! Every intercepted call runs a fixed-order chain of handlers:
//!
//! 1. [`FrozenObjectCheck`]: rejects calls on frozen mocks before
//!    anything is recorded
//! 2. [`CallRecorder`]: unconditionally appends the call to history
//! 3. [`MagicCallRecorder`]: additionally records calls that arrived
//!    through the dynamic-dispatch entry under the secondary channel
//! 4. [`StubCaller`]: resolves the answer, either the matched stub collection or
//!    the mock's default answer
//!
//! Recording always happens before stub resolution and is independent of
//! the stubbing outcome.

use crate::answer::{Answer, AnswerCollection};
use crate::recorder::Recorder;
use crate::slot::CallArgs;
use crate::stub::StubMapper;
use mirage_types::{MockError, MockResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Name of the dynamic-dispatch entry method.
///
/// Targets exposing name-based dynamic dispatch declare a method with
/// this name; unknown-method calls are rerouted through it as
/// `__call(name, [args...])`.
pub const DYNAMIC_CALL_METHOD: &str = "__call";

/// Immutable view of one invocation, handed to each handler
#[derive(Debug)]
pub struct HandlerContext<'a> {
    /// Invoked method name
    pub method: &'a str,
    /// Argument package
    pub args: &'a CallArgs,
}

/// The answer source selected by the chain
#[derive(Clone)]
pub enum ResolvedAnswer {
    /// A matched stub registration
    Stub(Arc<AnswerCollection>),
    /// The mock's default answer; used when no stub matched
    Default(Arc<dyn Answer>),
}

impl ResolvedAnswer {
    /// The answer to run for this call
    pub fn current(&self) -> Arc<dyn Answer> {
        match self {
            ResolvedAnswer::Stub(collection) => collection.current(),
            ResolvedAnswer::Default(answer) => Arc::clone(answer),
        }
    }

    /// Post-processing hook: advance the in-order answer cursor.
    ///
    /// Called exactly once per resolved call, after the value (or error)
    /// was produced. The default answer has no cursor to advance.
    pub fn commit(&self) {
        if let ResolvedAnswer::Stub(collection) = self {
            collection.commit();
        }
    }
}

/// One stage of the invocation pipeline
pub trait InvocationHandler: Send + Sync {
    /// Process one call.
    ///
    /// Returning an error aborts the chain; returning `Some` proposes an
    /// answer source (the composite keeps the last proposal).
    fn invoke(&self, call: &HandlerContext<'_>) -> MockResult<Option<ResolvedAnswer>>;
}

/// Rejects every call while the mock is frozen
pub struct FrozenObjectCheck {
    frozen: Arc<AtomicBool>,
    name: String,
}

impl FrozenObjectCheck {
    /// Gate calls on the given frozen flag
    pub fn new(frozen: Arc<AtomicBool>, name: impl Into<String>) -> Self {
        Self {
            frozen,
            name: name.into(),
        }
    }
}

impl InvocationHandler for FrozenObjectCheck {
    fn invoke(&self, _call: &HandlerContext<'_>) -> MockResult<Option<ResolvedAnswer>> {
        if self.frozen.load(Ordering::SeqCst) {
            return Err(MockError::FrozenMock {
                name: self.name.clone(),
            });
        }
        Ok(None)
    }
}

/// Unconditionally appends the call to the primary history channel
pub struct CallRecorder {
    recorder: Arc<Recorder>,
}

impl CallRecorder {
    /// Record into the given recorder
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self { recorder }
    }
}

impl InvocationHandler for CallRecorder {
    fn invoke(&self, call: &HandlerContext<'_>) -> MockResult<Option<ResolvedAnswer>> {
        self.recorder.append(call.method, call.args.clone());
        Ok(None)
    }
}

/// Records dynamic-dispatch calls under the secondary channel.
///
/// When the invoked method is [`DYNAMIC_CALL_METHOD`], the real method
/// name and argument list are unpacked from the two positional arguments
/// and recorded on the dynamic channel. Other calls pass through
/// untouched.
pub struct MagicCallRecorder {
    recorder: Arc<Recorder>,
}

impl MagicCallRecorder {
    /// Record into the given recorder's dynamic channel
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self { recorder }
    }
}

impl InvocationHandler for MagicCallRecorder {
    fn invoke(&self, call: &HandlerContext<'_>) -> MockResult<Option<ResolvedAnswer>> {
        if call.method != DYNAMIC_CALL_METHOD {
            return Ok(None);
        }
        let name = match call.args.get(0) {
            Some(value) => match value.as_str() {
                Some(s) => s.to_string(),
                None => return Ok(None),
            },
            None => return Ok(None),
        };
        let unpacked = match call.args.get(1) {
            Some(value) => match value.as_list() {
                Some(items) => CallArgs::from_values(items.to_vec()),
                None => CallArgs::new(),
            },
            None => CallArgs::new(),
        };
        self.recorder.append_dynamic(&name, unpacked);
        Ok(None)
    }
}

/// Resolves the answer source for the call
pub struct StubCaller {
    stubs: Arc<StubMapper>,
    default_answer: Arc<dyn Answer>,
}

impl StubCaller {
    /// Resolve against the given stub registry, falling back to `default_answer`
    pub fn new(stubs: Arc<StubMapper>, default_answer: Arc<dyn Answer>) -> Self {
        Self {
            stubs,
            default_answer,
        }
    }
}

impl InvocationHandler for StubCaller {
    fn invoke(&self, call: &HandlerContext<'_>) -> MockResult<Option<ResolvedAnswer>> {
        let resolved = match self.stubs.resolve(call.method, call.args) {
            Some(collection) => ResolvedAnswer::Stub(collection),
            None => ResolvedAnswer::Default(Arc::clone(&self.default_answer)),
        };
        Ok(Some(resolved))
    }
}

/// Runs handlers in fixed order, keeping the last proposed answer
pub struct Composite {
    handlers: Vec<Box<dyn InvocationHandler>>,
}

impl Composite {
    /// Create a composite over the given handlers
    pub fn new(handlers: Vec<Box<dyn InvocationHandler>>) -> Self {
        Self { handlers }
    }

    /// Run the chain.
    ///
    /// A handler error aborts immediately; no later handler runs. Returns
    /// the answer source proposed by the last handler that proposed one.
    pub fn invoke(&self, call: &HandlerContext<'_>) -> MockResult<ResolvedAnswer> {
        let mut resolved = None;
        for handler in &self.handlers {
            if let Some(answer) = handler.invoke(call)? {
                resolved = Some(answer);
            }
        }
        // The chain always ends in a StubCaller, which always proposes.
        match resolved {
            Some(answer) => Ok(answer),
            None => Ok(ResolvedAnswer::Default(Arc::new(crate::answer::NullAnswer))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::{ConstAnswer, NullAnswer};
    use crate::matcher::MethodMatcher;
    use crate::value::Value;

    fn run(chain: &Composite, method: &str, args: &CallArgs) -> MockResult<Value> {
        let resolved = chain.invoke(&HandlerContext { method, args })?;
        let answer = resolved.current();
        let result = answer.resolve(method, &mut args.clone());
        resolved.commit();
        result
    }

    fn standard_chain(
        frozen: Arc<AtomicBool>,
        recorder: Arc<Recorder>,
        stubs: Arc<StubMapper>,
    ) -> Composite {
        Composite::new(vec![
            Box::new(FrozenObjectCheck::new(frozen, "Target")),
            Box::new(CallRecorder::new(Arc::clone(&recorder))),
            Box::new(MagicCallRecorder::new(recorder)),
            Box::new(StubCaller::new(stubs, Arc::new(NullAnswer))),
        ])
    }

    #[test]
    fn test_frozen_mock_blocks_before_recording() {
        let frozen = Arc::new(AtomicBool::new(true));
        let recorder = Arc::new(Recorder::new());
        let chain = standard_chain(frozen, Arc::clone(&recorder), Arc::new(StubMapper::new()));

        let err = run(&chain, "add", &CallArgs::new()).unwrap_err();
        assert_eq!(err, MockError::FrozenMock { name: "Target".into() });
        assert!(recorder.history().is_empty());
    }

    #[test]
    fn test_recording_happens_even_without_stub() {
        let recorder = Arc::new(Recorder::new());
        let chain = standard_chain(
            Arc::new(AtomicBool::new(false)),
            Arc::clone(&recorder),
            Arc::new(StubMapper::new()),
        );

        let result = run(&chain, "add", &CallArgs::from_values(vec![Value::Int(1)])).unwrap();
        assert_eq!(result, Value::Null);
        assert_eq!(recorder.history().len(), 1);
        assert_eq!(recorder.history()[0].method, "add");
    }

    #[test]
    fn test_stub_resolution_after_recording() {
        let recorder = Arc::new(Recorder::new());
        let stubs = Arc::new(StubMapper::new());
        stubs.map(
            MethodMatcher::new("add", None),
            Arc::new(AnswerCollection::new(Arc::new(ConstAnswer::new(42)))),
        );
        let chain = standard_chain(
            Arc::new(AtomicBool::new(false)),
            Arc::clone(&recorder),
            stubs,
        );

        let result = run(&chain, "add", &CallArgs::new()).unwrap();
        assert_eq!(result, Value::Int(42));
        assert_eq!(recorder.history().len(), 1);
    }

    #[test]
    fn test_magic_call_lands_on_dynamic_channel() {
        let recorder = Arc::new(Recorder::new());
        let chain = standard_chain(
            Arc::new(AtomicBool::new(false)),
            Arc::clone(&recorder),
            Arc::new(StubMapper::new()),
        );

        let args = CallArgs::from_values(vec![
            Value::Str("missing".into()),
            Value::List(vec![Value::Int(1), Value::Int(2)]),
        ]);
        run(&chain, DYNAMIC_CALL_METHOD, &args).unwrap();

        // Primary channel holds the raw __call; dynamic channel holds the
        // unpacked method.
        assert_eq!(recorder.history().len(), 1);
        assert_eq!(recorder.history()[0].method, DYNAMIC_CALL_METHOD);
        let dynamic = recorder.dynamic_history();
        assert_eq!(dynamic.len(), 1);
        assert_eq!(dynamic[0].method, "missing");
        assert_eq!(dynamic[0].arg_values(), vec![Value::Int(1), Value::Int(2)]);
    }
}
