//! Target descriptors: the mockable description of a class or interface
//!
//! A [`TargetDescriptor`] is the engine's stand-in for reflection: it
//! carries everything the synthesizer needs to know about one real type.
//! Descriptors are immutable once registered.

use crate::signature::{MethodSignature, Param};
use serde::{Deserialize, Serialize};

/// Whether a target is a concrete class or an interface capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// A concrete (instantiable) class; at most one per mock
    Class,
    /// An interface capability contributing methods to the surface
    Interface,
}

/// Constructor contract of a target
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CtorSpec {
    /// Declared constructor parameters
    pub params: Vec<Param>,
    /// Whether the constructor is declared final (cannot be overridden)
    pub is_final: bool,
}

impl CtorSpec {
    /// Create a non-final constructor contract
    pub fn new(params: Vec<Param>) -> Self {
        Self {
            params,
            is_final: false,
        }
    }

    /// Mark the constructor final
    pub fn final_ctor(mut self) -> Self {
        self.is_final = true;
        self
    }
}

/// Description of one real class or interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// Type name
    pub name: String,
    /// Class or interface
    pub kind: TargetKind,
    /// Whether the type is declared final (rejects mocking)
    pub is_final: bool,
    /// Whether the type is declared readonly at the type level (rejects mocking)
    pub is_readonly: bool,
    /// Parent class (classes) or single extended interface chain head
    pub parent: Option<String>,
    /// Directly implemented/extended interfaces
    pub interfaces: Vec<String>,
    /// Declared constructor contract, if any
    pub constructor: Option<CtorSpec>,
    /// Declared methods, in declaration order
    pub methods: Vec<MethodSignature>,
}

impl TargetDescriptor {
    /// Describe a concrete class
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TargetKind::Class,
            is_final: false,
            is_readonly: false,
            parent: None,
            interfaces: Vec::new(),
            constructor: None,
            methods: Vec::new(),
        }
    }

    /// Describe an interface capability
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Interface,
            ..Self::class(name)
        }
    }

    /// Mark the type final
    pub fn sealed(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Mark the type readonly
    pub fn readonly(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    /// Set the parent type
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add an implemented/extended interface
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Set the constructor contract
    pub fn with_constructor(mut self, ctor: CtorSpec) -> Self {
        self.constructor = Some(ctor);
        self
    }

    /// Append a declared method
    pub fn with_method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    /// Whether this target is an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TargetKind::Interface
    }

    /// Look up a declared method by name
    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::TypeConstraint;
    use crate::signature::ReturnContract;

    #[test]
    fn test_class_builder() {
        let desc = TargetDescriptor::class("Base")
            .extends("Root")
            .implements("Countable")
            .with_method(
                MethodSignature::new("add")
                    .param(Param::new("x").typed(TypeConstraint::named("int")))
                    .param(Param::new("y").typed(TypeConstraint::named("int")))
                    .returns_type(TypeConstraint::named("int")),
            );

        assert_eq!(desc.kind, TargetKind::Class);
        assert_eq!(desc.parent.as_deref(), Some("Root"));
        assert_eq!(desc.interfaces, vec!["Countable".to_string()]);
        assert!(desc.method("add").is_some());
        assert!(desc.method("missing").is_none());
    }

    #[test]
    fn test_interface_builder() {
        let desc = TargetDescriptor::interface("Countable")
            .with_method(MethodSignature::new("count").returns_type(TypeConstraint::named("int")));
        assert!(desc.is_interface());
        assert!(!desc.is_final);
    }

    #[test]
    fn test_sealed_and_readonly_flags() {
        assert!(TargetDescriptor::class("A").sealed().is_final);
        assert!(TargetDescriptor::class("A").readonly().is_readonly);
    }

    #[test]
    fn test_descriptor_roundtrips_through_serde() {
        let desc = TargetDescriptor::class("Base").with_method(
            MethodSignature::new("halt").returns(ReturnContract::Never),
        );
        let json = serde_json::to_string(&desc).unwrap();
        let back: TargetDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(desc, back);
    }
}
