//! Declared type constraints for parameters and return values
//!
//! A constraint mirrors the source-level type text of a mocked target:
//! plain named types (optionally nullable), union and intersection forms,
//! the universal type, and the `self`/`parent` placeholders that the
//! synthesizer resolves to concrete owning-type names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the universal type, accepted and rendered as `mixed`
pub const ANY_TYPE: &str = "mixed";

/// Name of the null type
pub const NULL_TYPE: &str = "null";

/// A declared type constraint on a parameter or return value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeConstraint {
    /// A named type, optionally nullable (`?Foo`)
    Named {
        /// Type name as declared by the target
        name: String,
        /// Whether the declaration allows null (`?Foo`)
        nullable: bool,
    },

    /// Union form: `A|B|C`
    Union(Vec<TypeConstraint>),

    /// Intersection form: `A&B`
    Intersection(Vec<TypeConstraint>),

    /// The universal type (`mixed`)
    Any,

    /// Placeholder for the declaring type, resolved during synthesis
    SelfType,

    /// Placeholder for the declaring type's parent, resolved during synthesis
    ParentType,
}

impl TypeConstraint {
    /// Create a non-nullable named constraint
    pub fn named(name: impl Into<String>) -> Self {
        TypeConstraint::Named {
            name: name.into(),
            nullable: false,
        }
    }

    /// Create a nullable named constraint (`?Foo`)
    pub fn nullable(name: impl Into<String>) -> Self {
        TypeConstraint::Named {
            name: name.into(),
            nullable: true,
        }
    }

    /// Create a union constraint from its members
    pub fn union(members: Vec<TypeConstraint>) -> Self {
        TypeConstraint::Union(members)
    }

    /// Create an intersection constraint from its members
    pub fn intersection(members: Vec<TypeConstraint>) -> Self {
        TypeConstraint::Intersection(members)
    }

    /// Whether a null value satisfies this constraint.
    ///
    /// True for explicitly nullable named types, the `null` type itself,
    /// unions with any nullable member, and the universal type.
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeConstraint::Named { name, nullable } => *nullable || name == NULL_TYPE,
            TypeConstraint::Union(members) => members.iter().any(TypeConstraint::is_nullable),
            TypeConstraint::Intersection(_) => false,
            TypeConstraint::Any => true,
            TypeConstraint::SelfType | TypeConstraint::ParentType => false,
        }
    }

    /// Whether this constraint still contains an unresolved placeholder
    pub fn has_placeholder(&self) -> bool {
        match self {
            TypeConstraint::SelfType | TypeConstraint::ParentType => true,
            TypeConstraint::Union(members) | TypeConstraint::Intersection(members) => {
                members.iter().any(TypeConstraint::has_placeholder)
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeConstraint::Named { name, nullable } => {
                if *nullable {
                    write!(f, "?")?;
                }
                write!(f, "{}", name)
            }
            TypeConstraint::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    // Intersections nested in a union keep their grouping
                    if matches!(member, TypeConstraint::Intersection(_)) {
                        write!(f, "({})", member)?;
                    } else {
                        write!(f, "{}", member)?;
                    }
                }
                Ok(())
            }
            TypeConstraint::Intersection(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "&")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            TypeConstraint::Any => write!(f, "{}", ANY_TYPE),
            TypeConstraint::SelfType => write!(f, "self"),
            TypeConstraint::ParentType => write!(f, "parent"),
        }
    }
}
