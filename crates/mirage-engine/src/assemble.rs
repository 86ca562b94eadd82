//! Mock class assembly and the per-target-set class cache
//!
//! Assembly realizes a [`SynthesizedSurface`] as a [`MockClass`]: a
//! loadable method table that structurally satisfies every requested
//! target plus the generated-mock marker capability. Each class carries a
//! process-lifetime static info for static calls.
//!
//! The [`MockClassRegistry`] keys assembled classes by the sorted target
//! set; assembly is serialized behind its mutex so concurrent requests for
//! the same set cannot produce duplicate class definitions.

use crate::normalize::{default_rules, CapabilityRule};
use crate::registry::{RealFn, RealImpls, TargetRegistry};
use crate::synthesize::{SynthesizedMethod, SynthesizedSurface, Synthesizer};
use mirage_core::{Answer, InfoRegistry, MockInfo, Recorder, StubMapper};
use mirage_types::MockResult;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Marker capability implemented by every generated mock class
pub const MOCK_MARKER: &str = "MirageMock";

/// Assembly configuration
#[derive(Clone)]
pub struct AssemblerConfig {
    /// Capability normalization rule set
    pub rules: Vec<CapabilityRule>,
    /// Legacy targets exempt from strict default-value validation
    pub lenient_targets: Vec<String>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            rules: default_rules().to_vec(),
            lenient_targets: Vec::new(),
        }
    }
}

impl fmt::Debug for AssemblerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblerConfig")
            .field("rules", &self.rules.len())
            .field("lenient_targets", &self.lenient_targets)
            .finish()
    }
}

/// A loadable mock class: the realized method table for one target set
pub struct MockClass {
    name: String,
    mocked: String,
    surface: SynthesizedSurface,
    index: FxHashMap<String, usize>,
    implements: Vec<String>,
    real_impls: RealImpls,
    static_info: Arc<MockInfo>,
}

impl MockClass {
    /// Generated class name (unique per assembly)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Originating target name reported by the mock
    pub fn mocked(&self) -> &str {
        &self.mocked
    }

    /// The synthesized surface this class realizes
    pub fn surface(&self) -> &SynthesizedSurface {
        &self.surface
    }

    /// Look up a method in the table
    pub fn method(&self, name: &str) -> Option<&SynthesizedMethod> {
        self.index.get(name).map(|&i| &self.surface.methods[i])
    }

    /// Whether the table contains `name`
    pub fn has_method(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Whether the class structurally satisfies the named target
    pub fn implements(&self, target: &str) -> bool {
        self.implements.iter().any(|t| t == target)
    }

    /// The real implementation of `method`, if the base target registered one
    pub fn real_impl(&self, method: &str) -> Option<RealFn> {
        self.real_impls.get(method)
    }

    /// The real constructor, if the base target registered one
    pub fn real_ctor(&self) -> Option<RealFn> {
        self.real_impls.ctor()
    }

    /// Whether the real constructor is suppressed at instantiation time
    pub fn ctor_override(&self) -> bool {
        self.surface.ctor_override
    }

    /// The process-lifetime info used for static calls on this class
    pub fn static_info(&self) -> &Arc<MockInfo> {
        &self.static_info
    }
}

impl fmt::Debug for MockClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockClass")
            .field("name", &self.name)
            .field("mocked", &self.mocked)
            .field("methods", &self.surface.methods.len())
            .field("implements", &self.implements)
            .finish()
    }
}

/// Builds [`MockClass`] values from target names
pub struct Assembler<'a> {
    registry: &'a TargetRegistry,
    config: &'a AssemblerConfig,
    infos: &'a InfoRegistry,
}

impl<'a> Assembler<'a> {
    /// Create an assembler over the given collaborators
    pub fn new(
        registry: &'a TargetRegistry,
        config: &'a AssemblerConfig,
        infos: &'a InfoRegistry,
    ) -> Self {
        Self {
            registry,
            config,
            infos,
        }
    }

    /// Assemble a class named `class_name` for the given target set.
    ///
    /// The static info is created here and registered with the info
    /// registry; it lives as long as the class.
    pub fn assemble(
        &self,
        class_name: String,
        names: &[&str],
        default_answer: Arc<dyn Answer>,
    ) -> MockResult<Arc<MockClass>> {
        let synthesizer = Synthesizer::new(
            self.registry,
            &self.config.rules,
            &self.config.lenient_targets,
        );
        let surface = synthesizer.synthesize(names)?;

        let mut index = FxHashMap::default();
        for (i, method) in surface.methods.iter().enumerate() {
            index.insert(method.signature.name.clone(), i);
        }

        let mut implements: Vec<String> =
            names.iter().map(|n| n.to_string()).collect();
        for capability in &surface.capabilities {
            if !implements.iter().any(|t| t == capability) {
                implements.push(capability.clone());
            }
        }
        implements.push(MOCK_MARKER.to_string());

        let real_impls = surface
            .base
            .as_deref()
            .and_then(|base| self.registry.impls(base))
            .unwrap_or_default();

        let mocked = surface.primary_name().to_string();
        let static_info = MockInfo::new(
            mocked.clone(),
            Arc::new(Recorder::new()),
            Arc::new(StubMapper::new()),
            default_answer,
        );
        self.infos.register(Arc::clone(&static_info));

        Ok(Arc::new(MockClass {
            name: class_name,
            mocked,
            surface,
            index,
            implements,
            real_impls,
            static_info,
        }))
    }
}

/// Process-wide cache of assembled classes, keyed by sorted target set
#[derive(Default)]
pub struct MockClassRegistry {
    classes: Mutex<FxHashMap<Vec<String>, Arc<MockClass>>>,
    counter: AtomicUsize,
}

impl MockClassRegistry {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the class for `names`, assembling it at most once.
    ///
    /// The cache mutex is held across assembly, serializing concurrent
    /// requests for the same set.
    pub fn get_or_create<F>(&self, names: &[&str], assemble: F) -> MockResult<Arc<MockClass>>
    where
        F: FnOnce(String) -> MockResult<Arc<MockClass>>,
    {
        let mut key: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        key.sort();

        let mut classes = self.classes.lock();
        if let Some(class) = classes.get(&key) {
            return Ok(Arc::clone(class));
        }

        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        let class_name = format!("Mirage_{}_{}", names.join("_"), id);
        let class = assemble(class_name)?;
        classes.insert(key, Arc::clone(&class));
        Ok(class)
    }

    /// Number of cached classes
    pub fn len(&self) -> usize {
        self.classes.lock().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.classes.lock().is_empty()
    }
}

impl fmt::Debug for MockClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockClassRegistry").field("len", &self.len()).finish()
    }
}
