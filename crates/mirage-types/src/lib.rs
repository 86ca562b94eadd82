//! Mirage Type Model
//!
//! Descriptions of mockable target types: type constraints, method
//! signatures, target descriptors, and the engine-wide error taxonomy.
//!
//! This crate is pure data. The synthesis engine (`mirage-engine`) reads
//! descriptors from here and the runtime (`mirage-core`) reports failures
//! through the [`MockError`] taxonomy.

#![warn(missing_docs)]

pub mod constraint;
pub mod descriptor;
pub mod error;
pub mod signature;

pub use constraint::TypeConstraint;
pub use descriptor::{CtorSpec, TargetDescriptor, TargetKind};
pub use error::{MockError, MockResult};
pub use signature::{Literal, MethodSignature, Param, ParamDefault, ReturnContract, Visibility};
