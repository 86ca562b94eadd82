//! Mirage Mock Runtime
//!
//! This crate provides the per-call runtime of the mock engine:
//! - Dynamic values and by-value/by-reference argument slots
//! - Append-only call recording with a secondary dynamic-call channel
//! - Equality/wildcard argument matchers
//! - Programmable answers and in-order answer collections
//! - The stub registry (last-registered mapping wins)
//! - Per-mock info and the fixed-order invocation handler chain
//!
//! The synthesis engine (`mirage-engine`) builds mock classes whose single
//! generic dispatch entry drives the handler chain defined here.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod answer;
pub mod call;
pub mod handler;
pub mod info;
pub mod matcher;
pub mod recorder;
pub mod slot;
pub mod stub;
pub mod value;

pub use answer::{Answer, AnswerCollection, ConstAnswer, FnAnswer, NullAnswer, ParentAnswer, RaiseAnswer};
pub use call::RecordedCall;
pub use handler::{
    Composite, FrozenObjectCheck, HandlerContext, InvocationHandler, MagicCallRecorder,
    ResolvedAnswer, StubCaller, DYNAMIC_CALL_METHOD,
};
pub use info::{InfoRegistry, MockInfo, STRING_CONVERSION_METHOD};
pub use matcher::{any, eq, ArgMatcher, MethodMatcher};
pub use recorder::Recorder;
pub use slot::{shared, ArgSlot, CallArgs, SharedValue};
pub use stub::StubMapper;
pub use value::Value;
