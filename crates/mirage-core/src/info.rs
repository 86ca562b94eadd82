//! Per-mock info and the process-wide info registry
//!
//! One [`MockInfo`] exists per mock instance, plus one per generated
//! class for static calls. It owns the call recorder, the stub registry,
//! the default answer, the frozen flag, and the wired handler chain. It
//! is mutated only by handlers running on its own instance's calls.

use crate::answer::{Answer, AnswerCollection, ConstAnswer};
use crate::handler::{
    CallRecorder, Composite, FrozenObjectCheck, HandlerContext, MagicCallRecorder, ResolvedAnswer,
    StubCaller,
};
use crate::matcher::MethodMatcher;
use crate::recorder::Recorder;
use crate::slot::CallArgs;
use crate::stub::StubMapper;
use mirage_types::MockResult;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Name of the default string-conversion method.
///
/// Every mock auto-maps it to a textual identity answer so diagnostics
/// that stringify a mock get something readable.
pub const STRING_CONVERSION_METHOD: &str = "__toString";

/// Per-instance (or per-class, for statics) mock bookkeeping
pub struct MockInfo {
    name: String,
    recorder: Arc<Recorder>,
    stubs: Arc<StubMapper>,
    default_answer: Arc<dyn Answer>,
    frozen: Arc<AtomicBool>,
    chain: Composite,
}

impl MockInfo {
    /// Create info for a mock of `name`, wiring the fixed handler chain
    /// and the string-conversion identity stub.
    pub fn new(
        name: impl Into<String>,
        recorder: Arc<Recorder>,
        stubs: Arc<StubMapper>,
        default_answer: Arc<dyn Answer>,
    ) -> Arc<Self> {
        let name = name.into();
        let frozen = Arc::new(AtomicBool::new(false));

        let chain = Composite::new(vec![
            Box::new(FrozenObjectCheck::new(Arc::clone(&frozen), name.clone())),
            Box::new(CallRecorder::new(Arc::clone(&recorder))),
            Box::new(MagicCallRecorder::new(Arc::clone(&recorder))),
            Box::new(StubCaller::new(
                Arc::clone(&stubs),
                Arc::clone(&default_answer),
            )),
        ]);

        let info = Arc::new(Self {
            name,
            recorder,
            stubs,
            default_answer,
            frozen,
            chain,
        });
        info.map_identity_stub();
        info
    }

    fn map_identity_stub(&self) {
        self.stubs.map(
            MethodMatcher::new(STRING_CONVERSION_METHOD, None),
            Arc::new(AnswerCollection::new(Arc::new(ConstAnswer::new(format!(
                "Mock for {}",
                self.name
            ))))),
        );
    }

    /// Originating target name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The call recorder
    pub fn recorder(&self) -> &Arc<Recorder> {
        &self.recorder
    }

    /// The stub registry
    pub fn stubs(&self) -> &Arc<StubMapper> {
        &self.stubs
    }

    /// The default answer used when no stub matches
    pub fn default_answer(&self) -> &Arc<dyn Answer> {
        &self.default_answer
    }

    /// Run the handler chain for one call
    pub fn invoke_chain(&self, method: &str, args: &CallArgs) -> MockResult<ResolvedAnswer> {
        self.chain.invoke(&HandlerContext { method, args })
    }

    /// Disallow further calls on this mock
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    /// Allow calls again
    pub fn unfreeze(&self) {
        self.frozen.store(false, Ordering::SeqCst);
    }

    /// Whether the mock is frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }

    /// Restore creation state: clear history and stubs, unfreeze, and
    /// re-map the identity stub.
    pub fn reset(&self) {
        self.recorder.clear();
        self.stubs.clear();
        self.unfreeze();
        self.map_identity_stub();
    }
}

impl fmt::Debug for MockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockInfo")
            .field("name", &self.name)
            .field("frozen", &self.is_frozen())
            .field("stubs", &self.stubs.len())
            .finish()
    }
}

/// Tracks every live [`MockInfo`] for bulk reset between test runs
#[derive(Default)]
pub struct InfoRegistry {
    infos: Mutex<Vec<Arc<MockInfo>>>,
}

impl InfoRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an info
    pub fn register(&self, info: Arc<MockInfo>) {
        self.infos.lock().push(info);
    }

    /// Reset every tracked info to its creation state
    pub fn reset_all(&self) {
        for info in self.infos.lock().iter() {
            info.reset();
        }
    }

    /// Number of tracked infos
    pub fn len(&self) -> usize {
        self.infos.lock().len()
    }

    /// Whether no infos are tracked
    pub fn is_empty(&self) -> bool {
        self.infos.lock().is_empty()
    }
}

impl fmt::Debug for InfoRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfoRegistry").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::NullAnswer;
    use crate::value::Value;

    fn make_info(name: &str) -> Arc<MockInfo> {
        MockInfo::new(
            name,
            Arc::new(Recorder::new()),
            Arc::new(StubMapper::new()),
            Arc::new(NullAnswer),
        )
    }

    #[test]
    fn test_identity_stub_mapped_at_creation() {
        let info = make_info("Base");
        let args = CallArgs::new();
        let resolved = info.stubs().resolve(STRING_CONVERSION_METHOD, &args).unwrap();
        let value = resolved
            .current()
            .resolve(STRING_CONVERSION_METHOD, &mut CallArgs::new())
            .unwrap();
        assert_eq!(value, Value::Str("Mock for Base".into()));
    }

    #[test]
    fn test_freeze_unfreeze() {
        let info = make_info("Base");
        assert!(!info.is_frozen());
        info.freeze();
        assert!(info.is_frozen());
        assert!(info.invoke_chain("x", &CallArgs::new()).is_err());
        info.unfreeze();
        assert!(info.invoke_chain("x", &CallArgs::new()).is_ok());
    }

    #[test]
    fn test_reset_restores_creation_state() {
        let info = make_info("Base");
        info.freeze();
        info.recorder().append("x", CallArgs::new());

        info.reset();
        assert!(!info.is_frozen());
        assert!(info.recorder().history().is_empty());
        // Identity stub survives the reset
        assert!(info
            .stubs()
            .resolve(STRING_CONVERSION_METHOD, &CallArgs::new())
            .is_some());
    }

    #[test]
    fn test_registry_reset_all() {
        let registry = InfoRegistry::new();
        let a = make_info("A");
        let b = make_info("B");
        registry.register(Arc::clone(&a));
        registry.register(Arc::clone(&b));
        a.freeze();
        b.recorder().append("x", CallArgs::new());

        registry.reset_all();
        assert!(!a.is_frozen());
        assert!(b.recorder().history().is_empty());
        assert_eq!(registry.len(), 2);
    }
}
