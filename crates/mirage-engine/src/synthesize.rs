//! Signature synthesis: merging targets into one method surface
//!
//! The synthesizer merges N extracted targets into a single
//! non-conflicting [`SynthesizedSurface`]: at most one concrete base,
//! normalized and deduplicated capabilities, and a first-seen-wins method
//! merge (base first, then capabilities in declaration order). Each
//! retained method gets its `self`/`parent` placeholders resolved, its
//! defaults validated, and its return contract finalized.

use crate::extract::{ExtractedTarget, Extractor};
use crate::normalize::{normalize_capabilities, CapabilityRule};
use crate::registry::TargetRegistry;
use mirage_types::{
    CtorSpec, MethodSignature, MockError, MockResult, Param, ParamDefault, ReturnContract,
    TypeConstraint,
};

/// One method of the merged surface
#[derive(Debug, Clone)]
pub struct SynthesizedMethod {
    /// The fully resolved signature
    pub signature: MethodSignature,
    /// Whether a null return satisfies the return contract
    pub nullable_return: bool,
    /// Whether the method was declared by an interface capability.
    ///
    /// Interface-declared methods have no real ancestor implementation to
    /// delegate to.
    pub from_interface: bool,
}

/// The merged, deduplicated method surface for one target set
#[derive(Debug, Clone)]
pub struct SynthesizedSurface {
    /// Target names in requested order
    pub requested: Vec<String>,
    /// The concrete base target, if one was supplied
    pub base: Option<String>,
    /// Capability names after normalization and deduplication
    pub capabilities: Vec<String>,
    /// Merged methods; each name appears exactly once
    pub methods: Vec<SynthesizedMethod>,
    /// The base target's constructor contract, if any
    pub constructor: Option<CtorSpec>,
    /// Whether a constructor override suppressing the real constructor
    /// was generated
    pub ctor_override: bool,
}

impl SynthesizedSurface {
    /// Look up a merged method by name
    pub fn method(&self, name: &str) -> Option<&SynthesizedMethod> {
        self.methods.iter().find(|m| m.signature.name == name)
    }

    /// Whether the surface contains `name`
    pub fn has_method(&self, name: &str) -> bool {
        self.method(name).is_some()
    }

    /// The name the mock reports as its originating target: the base, or
    /// the first capability
    pub fn primary_name(&self) -> &str {
        self.base
            .as_deref()
            .or_else(|| self.capabilities.first().map(String::as_str))
            .unwrap_or("")
    }
}

/// Merges extracted targets into a [`SynthesizedSurface`]
pub struct Synthesizer<'a> {
    registry: &'a TargetRegistry,
    rules: &'a [CapabilityRule],
    lenient_targets: &'a [String],
}

impl<'a> Synthesizer<'a> {
    /// Create a synthesizer using the given normalization rules.
    ///
    /// `lenient_targets` downgrades the unrepresentable-default rejection
    /// for listed legacy targets.
    pub fn new(
        registry: &'a TargetRegistry,
        rules: &'a [CapabilityRule],
        lenient_targets: &'a [String],
    ) -> Self {
        Self {
            registry,
            rules,
            lenient_targets,
        }
    }

    /// Merge the named targets into one surface
    pub fn synthesize(&self, names: &[&str]) -> MockResult<SynthesizedSurface> {
        if names.is_empty() {
            return Err(MockError::InvalidTarget {
                name: String::new(),
                reason: "at least one target type is required".to_string(),
            });
        }

        let extractor = Extractor::new(self.registry);
        let mut base: Option<ExtractedTarget> = None;
        let mut capabilities: Vec<ExtractedTarget> = Vec::new();

        for name in names {
            let target = extractor.extract(name)?;
            if target.is_interface() {
                capabilities.push(target);
            } else if let Some(existing) = &base {
                return Err(MockError::MultipleBaseTypes {
                    first: existing.name().to_string(),
                    second: target.name().to_string(),
                });
            } else {
                base = Some(target);
            }
        }

        let capabilities = normalize_capabilities(&extractor, capabilities, self.rules)?;
        let capabilities = dedupe(capabilities);

        // First-seen wins: the base contributes first, then capabilities
        // in declaration order.
        let mut methods: Vec<SynthesizedMethod> = Vec::new();
        if let Some(base) = &base {
            self.merge_target(base, &mut methods)?;
        }
        for capability in &capabilities {
            self.merge_target(capability, &mut methods)?;
        }

        let ctor_override = base.as_ref().is_some_and(|base| {
            !base.ctor_final_in_chain
                && !base.ctor_in_interface
                && capabilities
                    .iter()
                    .all(|c| c.constructor.is_none() && !c.ctor_in_interface)
        });

        Ok(SynthesizedSurface {
            requested: names.iter().map(|n| n.to_string()).collect(),
            constructor: base.as_ref().and_then(|b| b.constructor.clone()),
            base: base.map(|b| b.name().to_string()),
            capabilities: capabilities.iter().map(|c| c.name().to_string()).collect(),
            methods,
            ctor_override,
        })
    }

    /// Merge one target's methods, skipping names already present
    fn merge_target(
        &self,
        target: &ExtractedTarget,
        methods: &mut Vec<SynthesizedMethod>,
    ) -> MockResult<()> {
        for method in &target.methods {
            if methods.iter().any(|m| m.signature.name == method.name) {
                continue;
            }
            methods.push(self.synthesize_method(target, method)?);
        }
        Ok(())
    }

    /// Resolve one method: placeholders, defaults, return contract
    fn synthesize_method(
        &self,
        target: &ExtractedTarget,
        method: &MethodSignature,
    ) -> MockResult<SynthesizedMethod> {
        let declaring = method.declared_in.as_deref().unwrap_or(target.name());
        let lenient = self.lenient_targets.iter().any(|t| t == declaring)
            || self.lenient_targets.iter().any(|t| t == target.name());

        let mut signature = method.clone();

        for (index, param) in signature.params.iter_mut().enumerate() {
            if param.variadic && index + 1 != method.params.len() {
                return Err(MockError::UnsupportedConstraint {
                    target: declaring.to_string(),
                    method: method.name.clone(),
                    detail: format!("variadic parameter {} must be last", param.name),
                });
            }
            self.resolve_param(declaring, &method.name, param, lenient)?;
        }

        if let ReturnContract::Value(constraint) = &signature.ret {
            let resolved = self.resolve_constraint(declaring, &method.name, constraint)?;
            signature.ret = ReturnContract::Value(resolved);
        }

        let nullable_return = match &signature.ret {
            ReturnContract::Value(constraint) => constraint.is_nullable(),
            ReturnContract::Void | ReturnContract::Never => false,
        };

        let from_interface = self
            .registry
            .get(declaring)
            .map(|d| d.is_interface())
            .unwrap_or(true);

        Ok(SynthesizedMethod {
            signature,
            nullable_return,
            from_interface,
        })
    }

    /// Resolve one parameter in place
    fn resolve_param(
        &self,
        declaring: &str,
        method: &str,
        param: &mut Param,
        lenient: bool,
    ) -> MockResult<()> {
        if let Some(constraint) = &param.constraint {
            let mut resolved = self.resolve_constraint(declaring, method, constraint)?;
            // A null default makes a plain named constraint implicitly
            // nullable.
            if matches!(
                param.default,
                ParamDefault::Literal(mirage_types::Literal::Null)
            ) {
                if let TypeConstraint::Named { nullable, .. } = &mut resolved {
                    *nullable = true;
                }
            }
            param.constraint = Some(resolved);
        }

        if matches!(param.default, ParamDefault::Unrepresentable) {
            if lenient {
                param.default = ParamDefault::None;
            } else {
                return Err(MockError::UnsupportedConstraint {
                    target: declaring.to_string(),
                    method: method.to_string(),
                    detail: format!(
                        "default value of parameter {} has no representable literal form",
                        param.name
                    ),
                });
            }
        }
        Ok(())
    }

    /// Resolve `self`/`parent` placeholders to concrete type names
    fn resolve_constraint(
        &self,
        declaring: &str,
        method: &str,
        constraint: &TypeConstraint,
    ) -> MockResult<TypeConstraint> {
        Ok(match constraint {
            TypeConstraint::SelfType => TypeConstraint::named(declaring),
            TypeConstraint::ParentType => {
                let parent = self
                    .registry
                    .get(declaring)
                    .and_then(|d| d.parent.clone())
                    .ok_or_else(|| MockError::UnsupportedConstraint {
                        target: declaring.to_string(),
                        method: method.to_string(),
                        detail: "parent placeholder used but the declaring type has no parent"
                            .to_string(),
                    })?;
                TypeConstraint::named(parent)
            }
            TypeConstraint::Union(members) => TypeConstraint::Union(
                members
                    .iter()
                    .map(|m| self.resolve_constraint(declaring, method, m))
                    .collect::<MockResult<Vec<_>>>()?,
            ),
            TypeConstraint::Intersection(members) => TypeConstraint::Intersection(
                members
                    .iter()
                    .map(|m| self.resolve_constraint(declaring, method, m))
                    .collect::<MockResult<Vec<_>>>()?,
            ),
            other => other.clone(),
        })
    }
}

/// Drop repeated capabilities, keeping the first occurrence
fn dedupe(capabilities: Vec<ExtractedTarget>) -> Vec<ExtractedTarget> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::with_capacity(capabilities.len());
    for capability in capabilities {
        if seen.iter().any(|name| name == capability.name()) {
            continue;
        }
        seen.push(capability.name().to_string());
        out.push(capability);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::default_rules;
    use mirage_types::{Literal, TargetDescriptor};

    fn synthesize(registry: &TargetRegistry, names: &[&str]) -> MockResult<SynthesizedSurface> {
        Synthesizer::new(registry, default_rules(), &[]).synthesize(names)
    }

    #[test]
    fn test_empty_target_list_is_rejected() {
        let registry = TargetRegistry::new();
        assert!(synthesize(&registry, &[]).is_err());
    }

    #[test]
    fn test_two_concrete_bases_are_rejected() {
        let registry = TargetRegistry::new();
        registry.register(TargetDescriptor::class("A"));
        registry.register(TargetDescriptor::class("B"));

        let err = synthesize(&registry, &["A", "B"]).unwrap_err();
        assert_eq!(
            err,
            MockError::MultipleBaseTypes {
                first: "A".into(),
                second: "B".into()
            }
        );
    }

    #[test]
    fn test_self_and_parent_placeholders_resolve() {
        let registry = TargetRegistry::new();
        registry.register(TargetDescriptor::class("Root"));
        registry.register(
            TargetDescriptor::class("Node").extends("Root").with_method(
                MethodSignature::new("clone_of")
                    .param(Param::new("template").typed(TypeConstraint::SelfType))
                    .returns_type(TypeConstraint::ParentType),
            ),
        );

        let surface = synthesize(&registry, &["Node"]).unwrap();
        let method = surface.method("clone_of").unwrap();
        assert_eq!(
            method.signature.params[0].constraint,
            Some(TypeConstraint::named("Node"))
        );
        assert_eq!(
            method.signature.ret,
            ReturnContract::Value(TypeConstraint::named("Root"))
        );
    }

    #[test]
    fn test_parent_placeholder_without_parent_is_unsupported() {
        let registry = TargetRegistry::new();
        registry.register(
            TargetDescriptor::class("Orphan").with_method(
                MethodSignature::new("up").returns_type(TypeConstraint::ParentType),
            ),
        );

        assert!(matches!(
            synthesize(&registry, &["Orphan"]).unwrap_err(),
            MockError::UnsupportedConstraint { .. }
        ));
    }

    #[test]
    fn test_null_default_implies_nullable() {
        let registry = TargetRegistry::new();
        registry.register(
            TargetDescriptor::class("Svc").with_method(
                MethodSignature::new("lookup").param(
                    Param::new("key")
                        .typed(TypeConstraint::named("string"))
                        .default_value(Literal::Null),
                ),
            ),
        );

        let surface = synthesize(&registry, &["Svc"]).unwrap();
        let param = &surface.method("lookup").unwrap().signature.params[0];
        assert_eq!(param.constraint, Some(TypeConstraint::nullable("string")));
    }

    #[test]
    fn test_unrepresentable_default_is_rejected_unless_lenient() {
        let registry = TargetRegistry::new();
        registry.register(
            TargetDescriptor::class("Legacy").with_method(
                MethodSignature::new("init")
                    .param(Param::new("options").unrepresentable_default()),
            ),
        );

        assert!(matches!(
            synthesize(&registry, &["Legacy"]).unwrap_err(),
            MockError::UnsupportedConstraint { .. }
        ));

        let lenient = vec!["Legacy".to_string()];
        let surface = Synthesizer::new(&registry, default_rules(), &lenient)
            .synthesize(&["Legacy"])
            .unwrap();
        assert_eq!(
            surface.method("init").unwrap().signature.params[0].default,
            ParamDefault::None
        );
    }

    #[test]
    fn test_misplaced_variadic_is_rejected() {
        let registry = TargetRegistry::new();
        registry.register(
            TargetDescriptor::class("Bad").with_method(
                MethodSignature::new("spread")
                    .param(Param::new("rest").variadic())
                    .param(Param::new("after")),
            ),
        );

        assert!(matches!(
            synthesize(&registry, &["Bad"]).unwrap_err(),
            MockError::UnsupportedConstraint { .. }
        ));
    }

    #[test]
    fn test_nullable_return_flag() {
        let registry = TargetRegistry::new();
        registry.register(
            TargetDescriptor::class("Svc")
                .with_method(
                    MethodSignature::new("find").returns_type(TypeConstraint::union(vec![
                        TypeConstraint::named("Row"),
                        TypeConstraint::named("null"),
                    ])),
                )
                .with_method(
                    MethodSignature::new("count").returns_type(TypeConstraint::named("int")),
                )
                .with_method(MethodSignature::new("anything")),
        );

        let surface = synthesize(&registry, &["Svc"]).unwrap();
        assert!(surface.method("find").unwrap().nullable_return);
        assert!(!surface.method("count").unwrap().nullable_return);
        // Undeclared return behaves as the universal type: nullable
        assert!(surface.method("anything").unwrap().nullable_return);
    }

    #[test]
    fn test_ctor_override_eligibility() {
        let registry = TargetRegistry::new();
        registry.register(TargetDescriptor::class("Plain").with_constructor(CtorSpec::new(vec![])));
        registry.register(
            TargetDescriptor::class("Locked")
                .with_constructor(CtorSpec::new(vec![]).final_ctor()),
        );
        registry.register(
            TargetDescriptor::interface("NeedsCtor").with_constructor(CtorSpec::new(vec![])),
        );
        registry.register(TargetDescriptor::interface("Countable"));

        assert!(synthesize(&registry, &["Plain"]).unwrap().ctor_override);
        assert!(!synthesize(&registry, &["Locked"]).unwrap().ctor_override);
        assert!(
            !synthesize(&registry, &["Plain", "NeedsCtor"])
                .unwrap()
                .ctor_override
        );
        assert!(
            synthesize(&registry, &["Plain", "Countable"])
                .unwrap()
                .ctor_override
        );
    }

    #[test]
    fn test_primary_name() {
        let registry = TargetRegistry::new();
        registry.register(TargetDescriptor::class("Base"));
        registry.register(TargetDescriptor::interface("Countable"));

        assert_eq!(
            synthesize(&registry, &["Countable", "Base"]).unwrap().primary_name(),
            "Base"
        );
        assert_eq!(
            synthesize(&registry, &["Countable"]).unwrap().primary_name(),
            "Countable"
        );
    }
}
