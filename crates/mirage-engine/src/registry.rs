//! Target registry: descriptors plus native real-implementation tables
//!
//! The registry is the engine's stand-in for reflection. Tests register a
//! [`TargetDescriptor`] per mockable type and, when parent delegation or
//! constructor chaining matters, a [`RealImpls`] table of Rust closures
//! standing in for the real method bodies.
//!
//! The built-in iteration capabilities are pre-seeded so capability
//! normalization has something to resolve against.

use mirage_core::{CallArgs, Value};
use mirage_types::{
    MethodSignature, MockResult, ReturnContract, TargetDescriptor, TypeConstraint,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the generic iterable capability (no iteration method of its own)
pub const ITERABLE: &str = "Iterable";

/// Name of the pull-based iteration capability
pub const ITERATOR: &str = "Iterator";

/// Name of the delegating iteration capability
pub const ITERATOR_AGGREGATE: &str = "IteratorAggregate";

/// Field storage of one mock instance (name → value)
pub type FieldMap = FxHashMap<String, Value>;

/// Native stand-in for a real method or constructor body
pub type RealFn = Arc<dyn Fn(&mut FieldMap, &mut CallArgs) -> MockResult<Value> + Send + Sync>;

/// Real-implementation table of one target
#[derive(Clone, Default)]
pub struct RealImpls {
    methods: FxHashMap<String, RealFn>,
    constructor: Option<RealFn>,
}

impl RealImpls {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the real body of `method`
    pub fn method<F>(mut self, method: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut FieldMap, &mut CallArgs) -> MockResult<Value> + Send + Sync + 'static,
    {
        self.methods.insert(method.into(), Arc::new(body));
        self
    }

    /// Register the real constructor body
    pub fn constructor<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut FieldMap, &mut CallArgs) -> MockResult<Value> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(body));
        self
    }

    /// Look up the real body of `method`
    pub fn get(&self, method: &str) -> Option<RealFn> {
        self.methods.get(method).cloned()
    }

    /// The real constructor body, if registered
    pub fn ctor(&self) -> Option<RealFn> {
        self.constructor.clone()
    }
}

impl fmt::Debug for RealImpls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealImpls")
            .field("methods", &self.methods.len())
            .field("has_constructor", &self.constructor.is_some())
            .finish()
    }
}

/// Registry of mockable target descriptions
pub struct TargetRegistry {
    targets: RwLock<FxHashMap<String, Arc<TargetDescriptor>>>,
    impls: RwLock<FxHashMap<String, RealImpls>>,
}

impl TargetRegistry {
    /// Create a registry pre-seeded with the built-in iteration capabilities
    pub fn new() -> Self {
        let registry = Self::empty();
        for descriptor in builtin_capabilities() {
            registry.register(descriptor);
        }
        registry
    }

    /// Create a registry with no built-ins
    pub fn empty() -> Self {
        Self {
            targets: RwLock::new(FxHashMap::default()),
            impls: RwLock::new(FxHashMap::default()),
        }
    }

    /// Register a target description, replacing any previous one
    pub fn register(&self, descriptor: TargetDescriptor) {
        self.targets
            .write()
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    /// Register a target description together with its real implementations
    pub fn register_with_impls(&self, descriptor: TargetDescriptor, impls: RealImpls) {
        let name = descriptor.name.clone();
        self.register(descriptor);
        self.impls.write().insert(name, impls);
    }

    /// Look up a target description
    pub fn get(&self, name: &str) -> Option<Arc<TargetDescriptor>> {
        self.targets.read().get(name).cloned()
    }

    /// Look up a target's real-implementation table
    pub fn impls(&self, name: &str) -> Option<RealImpls> {
        self.impls.read().get(name).cloned()
    }

    /// Whether a target is registered
    pub fn contains(&self, name: &str) -> bool {
        self.targets.read().contains_key(name)
    }

    /// Number of registered targets
    pub fn len(&self) -> usize {
        self.targets.read().len()
    }

    /// Whether no targets are registered
    pub fn is_empty(&self) -> bool {
        self.targets.read().is_empty()
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TargetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetRegistry").field("len", &self.len()).finish()
    }
}

/// The built-in iteration capability descriptors
fn builtin_capabilities() -> Vec<TargetDescriptor> {
    vec![
        TargetDescriptor::interface(ITERABLE),
        TargetDescriptor::interface(ITERATOR)
            .implements(ITERABLE)
            .with_method(MethodSignature::new("current"))
            .with_method(MethodSignature::new("key"))
            .with_method(MethodSignature::new("next").returns(ReturnContract::Void))
            .with_method(MethodSignature::new("rewind").returns(ReturnContract::Void))
            .with_method(
                MethodSignature::new("valid").returns_type(TypeConstraint::named("bool")),
            ),
        TargetDescriptor::interface(ITERATOR_AGGREGATE)
            .implements(ITERABLE)
            .with_method(
                MethodSignature::new("getIterator")
                    .returns_type(TypeConstraint::named(ITERABLE)),
            ),
    ]
}
