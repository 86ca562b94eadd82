//! Mirage Mock Engine
//!
//! This crate turns registered target descriptions into callable mocks:
//! - **Registry**: target descriptors plus native stand-ins for real
//!   implementations (`registry` module)
//! - **Extraction**: the overridable method surface of one target
//!   (`extract` module)
//! - **Synthesis**: merging multiple targets into one non-conflicting
//!   surface (`normalize`, `synthesize` modules)
//! - **Assembly**: a cached, loadable mock class per unique target set
//!   (`assemble` module)
//! - **Dispatch**: instance building and the per-call invocation pipeline
//!   (`instance` module)
//! - **API**: stubbing/verification builders and the engine facade
//!   (`stubbing`, `facade` modules)
//!
//! # Example
//!
//! ```rust,ignore
//! use mirage_engine::{MockEngine, TargetDescriptor, MethodSignature, TypeConstraint, Param, eq};
//!
//! let engine = MockEngine::new();
//! engine.register(
//!     TargetDescriptor::class("Calculator").with_method(
//!         MethodSignature::new("add")
//!             .param(Param::new("x").typed(TypeConstraint::named("int")))
//!             .param(Param::new("y").typed(TypeConstraint::named("int")))
//!             .returns_type(TypeConstraint::named("int")),
//!     ),
//! );
//!
//! let mock = engine.mock(&["Calculator"]).unwrap();
//! mock.when("add").with_args(vec![eq(1), eq(2)]).then_return(42);
//! assert_eq!(mock.call("add", vec![1.into(), 2.into()]).unwrap(), 42.into());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod assemble;
pub mod extract;
pub mod facade;
pub mod instance;
pub mod normalize;
pub mod registry;
pub mod stubbing;
pub mod synthesize;

pub use assemble::{Assembler, AssemblerConfig, MockClass, MockClassRegistry, MOCK_MARKER};
pub use extract::{ExtractedTarget, Extractor};
pub use facade::{Mock, MockEngine, MockOptions, StaticMock};
pub use instance::{InstanceBuilder, MockInstance};
pub use normalize::{default_rules, normalize_capabilities, CapabilityRule};
pub use registry::{FieldMap, RealFn, RealImpls, TargetRegistry, ITERABLE, ITERATOR, ITERATOR_AGGREGATE};
pub use stubbing::{CallVerifier, StubBuilder};
pub use synthesize::{SynthesizedMethod, SynthesizedSurface, Synthesizer};

// Re-export the data model and runtime types callers interact with.
pub use mirage_core::{
    any, eq, shared, Answer, AnswerCollection, ArgMatcher, ArgSlot, CallArgs, ConstAnswer,
    FnAnswer, InfoRegistry, MethodMatcher, MockInfo, NullAnswer, ParentAnswer, RaiseAnswer,
    RecordedCall, Recorder, SharedValue, StubMapper, Value, DYNAMIC_CALL_METHOD,
    STRING_CONVERSION_METHOD,
};
pub use mirage_types::{
    CtorSpec, Literal, MethodSignature, MockError, MockResult, Param, ParamDefault,
    ReturnContract, TargetDescriptor, TargetKind, TypeConstraint, Visibility,
};
