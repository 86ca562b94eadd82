//! Capability normalization rules
//!
//! A generated type must not claim a capability it cannot honor. The
//! canonical case: a capability that extends the generic iterable marker
//! without refining it to a concrete iteration protocol would produce a
//! type that claims to be iterable but exposes no iteration method. A
//! [`CapabilityRule`] describes the repair: when the marker is present
//! without any of its refinements, substitute a concrete refinement.
//!
//! The rule set is pluggable; [`default_rules`] carries the built-in
//! iteration rule.

use crate::extract::{ExtractedTarget, Extractor};
use crate::registry::{ITERABLE, ITERATOR, ITERATOR_AGGREGATE};
use mirage_types::MockResult;
use once_cell::sync::Lazy;

/// One normalization rule: `marker` present without any of `refinements`
/// → add `substitute`.
#[derive(Debug, Clone)]
pub struct CapabilityRule {
    /// Capability marker that must be honored by a refinement
    pub marker: String,
    /// Refinements that satisfy the marker
    pub refinements: Vec<String>,
    /// Capability substituted in when no refinement is present
    pub substitute: String,
}

impl CapabilityRule {
    /// Create a rule
    pub fn new(
        marker: impl Into<String>,
        refinements: Vec<String>,
        substitute: impl Into<String>,
    ) -> Self {
        Self {
            marker: marker.into(),
            refinements,
            substitute: substitute.into(),
        }
    }

    /// Whether the rule applies to `target`: it carries the marker but
    /// neither is nor extends any refinement.
    pub fn applies(&self, target: &ExtractedTarget) -> bool {
        if !target.has_capability(&self.marker) {
            return false;
        }
        !self
            .refinements
            .iter()
            .any(|refinement| target.has_capability(refinement))
    }
}

static DEFAULT_RULES: Lazy<Vec<CapabilityRule>> = Lazy::new(|| {
    vec![CapabilityRule::new(
        ITERABLE,
        vec![ITERATOR.to_string(), ITERATOR_AGGREGATE.to_string()],
        ITERATOR,
    )]
});

/// The built-in rule set: generic iterable without an iteration protocol
/// is refined to the pull-based iterator.
pub fn default_rules() -> &'static [CapabilityRule] {
    &DEFAULT_RULES
}

/// Apply `rules` to a capability list.
///
/// When a rule fires for a capability, the substitute capability is
/// inserted before it; the original is kept unless it *is* the bare
/// marker, in which case only the substitute remains.
pub fn normalize_capabilities(
    extractor: &Extractor<'_>,
    capabilities: Vec<ExtractedTarget>,
    rules: &[CapabilityRule],
) -> MockResult<Vec<ExtractedTarget>> {
    let mut normalized = Vec::with_capacity(capabilities.len());
    for capability in capabilities {
        match rules.iter().find(|rule| rule.applies(&capability)) {
            Some(rule) => {
                normalized.push(extractor.extract(&rule.substitute)?);
                if capability.name() != rule.marker {
                    normalized.push(capability);
                }
            }
            None => normalized.push(capability),
        }
    }
    Ok(normalized)
}
