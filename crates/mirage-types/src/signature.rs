//! Method signatures: parameters, defaults, and return contracts

use crate::constraint::TypeConstraint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A default value with a representable literal form.
///
/// Object-valued defaults without a literal form cannot be embedded in a
/// synthesized signature and are declared as [`ParamDefault::Unrepresentable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// `null`
    Null,
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Default value of a parameter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ParamDefault {
    /// No default: the parameter is required
    #[default]
    None,
    /// A literal default, embedded verbatim in the synthesized signature
    Literal(Literal),
    /// An object default with no literal form; rejected at synthesis time
    Unrepresentable,
}

impl ParamDefault {
    /// Whether a default value is present (literal or not)
    pub fn is_some(&self) -> bool {
        !matches!(self, ParamDefault::None)
    }
}

/// One declared parameter of a method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Declared type constraint, if any
    pub constraint: Option<TypeConstraint>,
    /// Whether the parameter is passed by reference
    pub by_ref: bool,
    /// Whether the parameter is variadic (must be last)
    pub variadic: bool,
    /// Default value
    pub default: ParamDefault,
}

impl Param {
    /// Create an untyped, required, by-value parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            by_ref: false,
            variadic: false,
            default: ParamDefault::None,
        }
    }

    /// Set the declared type constraint
    pub fn typed(mut self, constraint: TypeConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Mark the parameter as pass-by-reference
    pub fn by_ref(mut self) -> Self {
        self.by_ref = true;
        self
    }

    /// Mark the parameter as variadic
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Set a literal default value
    pub fn default_value(mut self, literal: Literal) -> Self {
        self.default = ParamDefault::Literal(literal);
        self
    }

    /// Mark the default value as unrepresentable
    pub fn unrepresentable_default(mut self) -> Self {
        self.default = ParamDefault::Unrepresentable;
        self
    }
}

/// What a method promises to do about returning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReturnContract {
    /// Returns a value of the given declared type
    Value(TypeConstraint),
    /// Returns no value; any produced value is suppressed
    Void,
    /// Must not return normally; invocation raises instead
    Never,
}

impl ReturnContract {
    /// Whether this is the `Never` contract
    pub fn is_never(&self) -> bool {
        matches!(self, ReturnContract::Never)
    }

    /// Whether this is the `Void` contract
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnContract::Void)
    }
}

impl Default for ReturnContract {
    /// An undeclared return type behaves as the universal type
    fn default() -> Self {
        ReturnContract::Value(TypeConstraint::Any)
    }
}

/// Method visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Callable from anywhere
    Public,
    /// Callable from the type and its descendants
    Protected,
    /// Callable only from the declaring type; never part of a mock surface
    Private,
}

/// One declared method of a target type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name
    pub name: String,
    /// Visibility
    pub visibility: Visibility,
    /// Whether the method dispatches on the type rather than an instance
    pub is_static: bool,
    /// Whether the method is declared final (not overridable)
    pub is_final: bool,
    /// Ordered parameter list
    pub params: Vec<Param>,
    /// Return contract
    pub ret: ReturnContract,
    /// Name of the target that declared this method.
    ///
    /// Filled in by the extractor; used for diamond resolution and to
    /// decide whether parent delegation can reach a real implementation.
    pub declared_in: Option<String>,
}

impl MethodSignature {
    /// Create a public instance method with the universal return type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
            params: Vec::new(),
            ret: ReturnContract::default(),
            declared_in: None,
        }
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the method static
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark the method final
    pub fn final_method(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Append a parameter
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Set the return contract
    pub fn returns(mut self, ret: ReturnContract) -> Self {
        self.ret = ret;
        self
    }

    /// Set the return contract to a value of the given type
    pub fn returns_type(self, constraint: TypeConstraint) -> Self {
        self.returns(ReturnContract::Value(constraint))
    }

    /// Whether the method declares a variadic tail parameter
    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(|p| p.variadic)
    }

    /// Number of leading non-variadic parameters
    pub fn fixed_param_count(&self) -> usize {
        self.params.iter().filter(|p| !p.variadic).count()
    }
}
