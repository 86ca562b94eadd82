//! Engine-wide error taxonomy
//!
//! Construction-time errors (`InvalidTarget`, `MultipleBaseTypes`,
//! `UnsupportedConstraint`) abort assembly and surface to the caller
//! creating the mock. Call-time errors (`FrozenMock`, `NeverReturnInvoked`,
//! `UnknownMethod`, `Raised`) abort only the current call.

use thiserror::Error;

/// Errors raised by mock synthesis and invocation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MockError {
    /// Target is final, readonly, or not registered
    #[error("Invalid mock target [{name}]: {reason}")]
    InvalidTarget {
        /// Target type name
        name: String,
        /// Why the target cannot be mocked
        reason: String,
    },

    /// More than one concrete class supplied for a single mock
    #[error("You cannot use two classes in the same mock: {first}, {second}. Use interfaces instead.")]
    MultipleBaseTypes {
        /// First concrete class seen
        first: String,
        /// Second concrete class seen
        second: String,
    },

    /// Call made on a mock marked frozen
    #[error("Mock for {name} is frozen; no further interaction is allowed")]
    FrozenMock {
        /// Originating target name of the frozen mock
        name: String,
    },

    /// A method declared never-returning was invoked
    #[error("Method {method} is declared to never return, but it was called")]
    NeverReturnInvoked {
        /// Invoked method name
        method: String,
    },

    /// A parameter or return type form the synthesizer cannot represent
    #[error("Unsupported type constraint on {target}::{method}: {detail}")]
    UnsupportedConstraint {
        /// Owning target name
        target: String,
        /// Offending method name
        method: String,
        /// What could not be represented
        detail: String,
    },

    /// Dispatch on a name absent from the synthesized surface
    #[error("Unknown method {method} on mock class {class}")]
    UnknownMethod {
        /// Generated mock class name
        class: String,
        /// Requested method name
        method: String,
    },

    /// An error programmed into a stub answer
    #[error("{0}")]
    Raised(String),

    /// A call-count expectation over the recorded history failed
    #[error("Verification of {method} failed: expected {expected}, got {actual} matching call(s)")]
    VerificationFailed {
        /// Verified method name
        method: String,
        /// Expected call-count description
        expected: String,
        /// Matching calls actually recorded
        actual: usize,
    },
}

/// Result alias used across the engine
pub type MockResult<T> = Result<T, MockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MockError::InvalidTarget {
            name: "FinalThing".into(),
            reason: "final classes cannot be mocked".into(),
        };
        assert!(err.to_string().contains("FinalThing"));

        let err = MockError::MultipleBaseTypes {
            first: "A".into(),
            second: "B".into(),
        };
        assert!(err.to_string().contains("Use interfaces instead"));

        let err = MockError::NeverReturnInvoked {
            method: "halt".into(),
        };
        assert!(err.to_string().contains("halt"));
    }
}
