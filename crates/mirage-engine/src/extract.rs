//! Target descriptor extraction
//!
//! The extractor turns one registered target name into an
//! [`ExtractedTarget`]: the flattened, overridable method surface plus the
//! ancestry facts the synthesizer and assembler need (transitive
//! capability set, constructor contract and its finality/interface
//! provenance).

use crate::registry::TargetRegistry;
use mirage_types::{
    CtorSpec, MethodSignature, MockError, MockResult, TargetDescriptor, Visibility,
};
use std::sync::Arc;

/// Constructor method name, excluded from the overridable surface
const CONSTRUCTOR_NAME: &str = "__construct";

/// Destructor method name, excluded from the overridable surface
const DESTRUCTOR_NAME: &str = "__destruct";

/// One target with its full mockable capability description
#[derive(Debug, Clone)]
pub struct ExtractedTarget {
    /// The registered descriptor
    pub descriptor: Arc<TargetDescriptor>,
    /// Flattened overridable methods: own first, then inherited, then
    /// capability-declared; first-seen name wins. `declared_in` is filled
    /// with the declaring target on every entry.
    pub methods: Vec<MethodSignature>,
    /// Transitive closure of implemented/extended capability names
    pub all_interfaces: Vec<String>,
    /// Nearest declared constructor contract (own or inherited)
    pub constructor: Option<CtorSpec>,
    /// Whether any constructor in the ancestry is declared final
    pub ctor_final_in_chain: bool,
    /// Whether a constructor contract comes from an interface capability
    pub ctor_in_interface: bool,
}

impl ExtractedTarget {
    /// Target name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Whether the target is an interface capability
    pub fn is_interface(&self) -> bool {
        self.descriptor.is_interface()
    }

    /// Whether the target extends or is the named capability
    pub fn has_capability(&self, name: &str) -> bool {
        self.descriptor.name == name || self.all_interfaces.iter().any(|i| i == name)
    }
}

/// Extracts mockable capability descriptions from the registry
pub struct Extractor<'a> {
    registry: &'a TargetRegistry,
}

impl<'a> Extractor<'a> {
    /// Create an extractor over `registry`
    pub fn new(registry: &'a TargetRegistry) -> Self {
        Self { registry }
    }

    /// Extract the named target.
    ///
    /// Fails with [`MockError::InvalidTarget`] when the name is not
    /// registered or the target is final or readonly; none of these can
    /// be safely subclassed.
    pub fn extract(&self, name: &str) -> MockResult<ExtractedTarget> {
        let descriptor = self.registry.get(name).ok_or_else(|| MockError::InvalidTarget {
            name: name.to_string(),
            reason: "the class or interface does not exist; check the spelling and make sure it is registered".to_string(),
        })?;

        if descriptor.is_final {
            return Err(MockError::InvalidTarget {
                name: name.to_string(),
                reason: "final classes cannot be mocked".to_string(),
            });
        }
        if descriptor.is_readonly {
            return Err(MockError::InvalidTarget {
                name: name.to_string(),
                reason: "readonly classes cannot be mocked".to_string(),
            });
        }

        let mut methods: Vec<MethodSignature> = Vec::new();
        let mut all_interfaces: Vec<String> = Vec::new();
        let mut constructor: Option<CtorSpec> = None;
        let mut ctor_final_in_chain = false;
        let mut ctor_in_interface = false;

        // Walk the declaration chain: the target itself, then ancestors.
        let mut chain: Vec<Arc<TargetDescriptor>> = Vec::new();
        let mut cursor = Some(Arc::clone(&descriptor));
        while let Some(current) = cursor {
            cursor = current
                .parent
                .as_deref()
                .and_then(|parent| self.registry.get(parent));
            chain.push(current);
        }

        for link in &chain {
            self.collect_methods(link, &mut methods);

            if let Some(ctor) = &link.constructor {
                if ctor.is_final {
                    ctor_final_in_chain = true;
                }
                if link.is_interface() {
                    ctor_in_interface = true;
                }
                if constructor.is_none() {
                    constructor = Some(ctor.clone());
                }
            }

            for interface in &link.interfaces {
                self.collect_interface_closure(interface, &mut all_interfaces);
            }
        }

        // Capability-declared methods join the surface after inherited ones.
        for interface in all_interfaces.clone() {
            if let Some(capability) = self.registry.get(&interface) {
                self.collect_methods(&capability, &mut methods);
                if capability.constructor.is_some() {
                    ctor_in_interface = true;
                }
            }
        }

        Ok(ExtractedTarget {
            descriptor,
            methods,
            all_interfaces,
            constructor,
            ctor_final_in_chain,
            ctor_in_interface,
        })
    }

    /// Append `source`'s overridable methods not yet present by name
    fn collect_methods(&self, source: &TargetDescriptor, methods: &mut Vec<MethodSignature>) {
        for method in &source.methods {
            if method.name == CONSTRUCTOR_NAME || method.name == DESTRUCTOR_NAME {
                continue;
            }
            if method.is_final || method.visibility == Visibility::Private {
                continue;
            }
            if methods.iter().any(|m| m.name == method.name) {
                continue;
            }
            let mut method = method.clone();
            method.declared_in = Some(source.name.clone());
            methods.push(method);
        }
    }

    /// Add `name` and every capability it extends to `closure`, in
    /// first-seen order. Unregistered capability names are kept without
    /// recursing.
    fn collect_interface_closure(&self, name: &str, closure: &mut Vec<String>) {
        if closure.iter().any(|existing| existing == name) {
            return;
        }
        closure.push(name.to_string());
        if let Some(descriptor) = self.registry.get(name) {
            for extended in &descriptor.interfaces {
                self.collect_interface_closure(extended, closure);
            }
            if let Some(parent) = &descriptor.parent {
                self.collect_interface_closure(parent, closure);
            }
        }
    }
}
