//! The engine facade
//!
//! [`MockEngine`] owns the collaborating registries and exposes the
//! public workflow: register targets, create mocks, reset everything
//! between test runs. [`Mock`] and [`StaticMock`] are the handles tests
//! interact with.

use crate::assemble::{Assembler, AssemblerConfig, MockClass, MockClassRegistry, MOCK_MARKER};
use crate::instance::{InstanceBuilder, MockInstance};
use crate::registry::{RealImpls, TargetRegistry};
use crate::stubbing::{CallVerifier, StubBuilder};
use mirage_core::{Answer, CallArgs, InfoRegistry, MockInfo, NullAnswer, RecordedCall, Value};
use mirage_types::{MockResult, TargetDescriptor};
use std::fmt;
use std::sync::Arc;

/// Options for creating one mock instance
#[derive(Default)]
pub struct MockOptions {
    /// Arguments for the real constructor; `None` leaves the instance
    /// never-constructed
    pub constructor_args: Option<Vec<Value>>,
    /// Default answer used when no stub matches; `None` means the
    /// null answer
    pub default_answer: Option<Arc<dyn Answer>>,
}

impl MockOptions {
    /// Empty options: no constructor arguments, null default answer
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply real-constructor arguments
    pub fn constructor_args(mut self, args: Vec<Value>) -> Self {
        self.constructor_args = Some(args);
        self
    }

    /// Supply the default answer
    pub fn default_answer(mut self, answer: Arc<dyn Answer>) -> Self {
        self.default_answer = Some(answer);
        self
    }
}

impl fmt::Debug for MockOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockOptions")
            .field("constructor_args", &self.constructor_args)
            .field("has_default_answer", &self.default_answer.is_some())
            .finish()
    }
}

/// The mock engine: target registry, class cache, and live-info tracking
pub struct MockEngine {
    targets: TargetRegistry,
    classes: MockClassRegistry,
    infos: InfoRegistry,
    config: AssemblerConfig,
}

impl MockEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::with_config(AssemblerConfig::default())
    }

    /// Create an engine with a custom assembler configuration
    pub fn with_config(config: AssemblerConfig) -> Self {
        Self {
            targets: TargetRegistry::new(),
            classes: MockClassRegistry::new(),
            infos: InfoRegistry::new(),
            config,
        }
    }

    /// Register a mockable target description
    pub fn register(&self, descriptor: TargetDescriptor) {
        self.targets.register(descriptor);
    }

    /// Register a target description with its real implementations
    pub fn register_with_impls(&self, descriptor: TargetDescriptor, impls: RealImpls) {
        self.targets.register_with_impls(descriptor, impls);
    }

    /// The target registry
    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    /// Create a mock of the given target set with default options
    pub fn mock(&self, names: &[&str]) -> MockResult<Mock> {
        self.mock_with(names, MockOptions::default())
    }

    /// Create a mock of the given target set
    pub fn mock_with(&self, names: &[&str], options: MockOptions) -> MockResult<Mock> {
        let default_answer: Arc<dyn Answer> = options
            .default_answer
            .unwrap_or_else(|| Arc::new(NullAnswer));

        let class = self.class_for(names, &default_answer)?;
        let (instance, info) = InstanceBuilder::new(&self.infos).build(
            Arc::clone(&class),
            Arc::clone(&default_answer),
            options.constructor_args,
        )?;
        Ok(Mock { instance, info })
    }

    /// A handle for static calls on the generated class of a target set
    pub fn statics(&self, names: &[&str]) -> MockResult<StaticMock> {
        let default_answer: Arc<dyn Answer> = Arc::new(NullAnswer);
        let class = self.class_for(names, &default_answer)?;
        Ok(StaticMock { class })
    }

    fn class_for(
        &self,
        names: &[&str],
        default_answer: &Arc<dyn Answer>,
    ) -> MockResult<Arc<MockClass>> {
        self.classes.get_or_create(names, |class_name| {
            Assembler::new(&self.targets, &self.config, &self.infos).assemble(
                class_name,
                names,
                Arc::clone(default_answer),
            )
        })
    }

    /// Reset every live mock (instance and static) to creation state
    pub fn reset_all(&self) {
        self.infos.reset_all();
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockEngine")
            .field("targets", &self.targets.len())
            .field("classes", &self.classes.len())
            .field("infos", &self.infos.len())
            .finish()
    }
}

/// Handle to one mock instance
pub struct Mock {
    instance: Arc<MockInstance>,
    info: Arc<MockInfo>,
}

impl Mock {
    /// Invoke a method with by-value arguments
    pub fn call(&self, method: &str, values: Vec<Value>) -> MockResult<Value> {
        self.instance.call(method, values)
    }

    /// Invoke a method with a prepared argument package
    pub fn call_args(&self, method: &str, args: CallArgs) -> MockResult<Value> {
        self.instance.call_args(method, args)
    }

    /// Start stubbing `method`
    pub fn when(&self, method: impl Into<String>) -> StubBuilder {
        StubBuilder::new(Arc::clone(&self.info), method)
    }

    /// Start verifying `method`
    pub fn verify(&self, method: impl Into<String>) -> CallVerifier {
        CallVerifier::new(Arc::clone(&self.info), method)
    }

    /// Full primary-channel call history
    pub fn history(&self) -> Vec<RecordedCall> {
        self.info.recorder().history()
    }

    /// Full dynamic-channel call history
    pub fn dynamic_history(&self) -> Vec<RecordedCall> {
        self.info.recorder().dynamic_history()
    }

    /// Disallow further calls on this mock
    pub fn freeze(&self) {
        self.info.freeze();
    }

    /// Allow calls again
    pub fn unfreeze(&self) {
        self.info.unfreeze();
    }

    /// Reset this mock to creation state
    pub fn reset(&self) {
        self.info.reset();
    }

    /// Whether the underlying class is a generated mock
    pub fn is_mock(&self) -> bool {
        self.instance.class().implements(MOCK_MARKER)
    }

    /// Originating target name
    pub fn mocked_name(&self) -> &str {
        self.info.name()
    }

    /// The underlying instance
    pub fn instance(&self) -> &Arc<MockInstance> {
        &self.instance
    }

    /// The generated class
    pub fn class(&self) -> &Arc<MockClass> {
        self.instance.class()
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("class", &self.class().name())
            .field("mocked", &self.mocked_name())
            .finish()
    }
}

/// Handle for static calls on a generated class
pub struct StaticMock {
    class: Arc<MockClass>,
}

impl StaticMock {
    /// Invoke a static method
    pub fn call(&self, method: &str, values: Vec<Value>) -> MockResult<Value> {
        self.class.call_static(method, values)
    }

    /// Start stubbing a static method
    pub fn when(&self, method: impl Into<String>) -> StubBuilder {
        StubBuilder::new(Arc::clone(self.class.static_info()), method)
    }

    /// Start verifying a static method
    pub fn verify(&self, method: impl Into<String>) -> CallVerifier {
        CallVerifier::new(Arc::clone(self.class.static_info()), method)
    }

    /// Full static-call history of the class
    pub fn history(&self) -> Vec<RecordedCall> {
        self.class.static_info().recorder().history()
    }

    /// The generated class
    pub fn class(&self) -> &Arc<MockClass> {
        &self.class
    }
}

impl fmt::Debug for StaticMock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticMock")
            .field("class", &self.class.name())
            .finish()
    }
}
