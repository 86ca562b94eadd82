//! Mock instances and the per-call dispatch pipeline
//!
//! [`MockInstance`] is the dynamic proxy: field storage, an optional
//! attached info, and stored constructor arguments. [`dispatch`] is the
//! single generic method body every synthesized method shares:
//!
//! 1. Materialize trailing literal defaults for omitted arguments
//! 2. Resolve the instance's (or class's) info; a detached instance
//!    short-circuits to the null/void default without recording
//! 3. Run the handler chain (freeze gate, recording, stub resolution)
//! 4. Run the resolved answer, routing the parent-delegate marker to the
//!    real ancestor implementation
//! 5. Advance the answer cursor, then apply the return contract

use crate::assemble::MockClass;
use crate::registry::FieldMap;
use mirage_core::{
    Answer, ArgSlot, CallArgs, InfoRegistry, MockInfo, Recorder, StubMapper, Value,
    DYNAMIC_CALL_METHOD,
};
use mirage_types::{MockError, MockResult, ParamDefault, ReturnContract};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// One instance of a generated mock class
pub struct MockInstance {
    class: Arc<MockClass>,
    fields: Mutex<FieldMap>,
    info: Mutex<Option<Arc<MockInfo>>>,
    ctor_args: Mutex<Option<Vec<Value>>>,
}

impl MockInstance {
    /// The generated class of this instance
    pub fn class(&self) -> &Arc<MockClass> {
        &self.class
    }

    /// The attached info, if any
    pub fn info(&self) -> Option<Arc<MockInfo>> {
        self.info.lock().clone()
    }

    /// Stored constructor arguments not yet consumed by the real constructor
    pub fn constructor_args(&self) -> Option<Vec<Value>> {
        self.ctor_args.lock().clone()
    }

    /// Read a field value
    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.lock().get(name).cloned()
    }

    /// Write a field value
    pub fn set_field(&self, name: impl Into<String>, value: Value) {
        self.fields.lock().insert(name.into(), value);
    }

    /// Invoke a method with by-value arguments
    pub fn call(&self, method: &str, values: Vec<Value>) -> MockResult<Value> {
        self.call_args(method, CallArgs::from_values(values))
    }

    /// Invoke a method with a prepared argument package (by-reference
    /// slots, variadic tails)
    pub fn call_args(&self, method: &str, args: CallArgs) -> MockResult<Value> {
        dispatch(&self.class, Some(self), method, args)
    }
}

impl fmt::Debug for MockInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockInstance")
            .field("class", &self.class.name())
            .field("attached", &self.info.lock().is_some())
            .finish()
    }
}

impl MockClass {
    /// Invoke a static method on this class
    pub fn call_static(&self, method: &str, values: Vec<Value>) -> MockResult<Value> {
        dispatch(self, None, method, CallArgs::from_values(values))
    }

    /// Invoke a static method with a prepared argument package
    pub fn call_static_args(&self, method: &str, args: CallArgs) -> MockResult<Value> {
        dispatch(self, None, method, args)
    }
}

/// Builds instances of generated classes
pub struct InstanceBuilder<'a> {
    infos: &'a InfoRegistry,
}

impl<'a> InstanceBuilder<'a> {
    /// Create a builder registering infos with `infos`
    pub fn new(infos: &'a InfoRegistry) -> Self {
        Self { infos }
    }

    /// Allocate an instance without running any constructor, attach fresh
    /// info, then chain the real constructor when arguments were supplied.
    ///
    /// The stored arguments are single-use: once the real constructor
    /// consumed them they are cleared. Without arguments the instance
    /// stays in its never-constructed state. Returns the instance together
    /// with its attached info.
    pub fn build(
        &self,
        class: Arc<MockClass>,
        default_answer: Arc<dyn Answer>,
        ctor_args: Option<Vec<Value>>,
    ) -> MockResult<(Arc<MockInstance>, Arc<MockInfo>)> {
        let instance = Arc::new(MockInstance {
            class: Arc::clone(&class),
            fields: Mutex::new(FieldMap::default()),
            info: Mutex::new(None),
            ctor_args: Mutex::new(ctor_args),
        });

        let info = MockInfo::new(
            class.mocked(),
            Arc::new(Recorder::new()),
            Arc::new(StubMapper::new()),
            default_answer,
        );
        self.infos.register(Arc::clone(&info));
        *instance.info.lock() = Some(Arc::clone(&info));

        let pending = instance.ctor_args.lock().clone();
        if let (Some(values), Some(ctor)) = (pending, class.real_ctor()) {
            let mut args = CallArgs::from_values(values);
            {
                let mut fields = instance.fields.lock();
                ctor(&mut fields, &mut args)?;
            }
            *instance.ctor_args.lock() = None;
        }

        Ok((instance, info))
    }

    /// Allocate a detached instance: no info attached, calls short-circuit
    pub fn detached(class: Arc<MockClass>) -> Arc<MockInstance> {
        Arc::new(MockInstance {
            class,
            fields: Mutex::new(FieldMap::default()),
            info: Mutex::new(None),
            ctor_args: Mutex::new(None),
        })
    }
}

/// The shared generic method body of every synthesized method
fn dispatch(
    class: &MockClass,
    receiver: Option<&MockInstance>,
    method: &str,
    mut args: CallArgs,
) -> MockResult<Value> {
    let synthesized = match class.method(method) {
        Some(m) => m,
        None => {
            // Unknown names reroute through the dynamic-dispatch entry
            // when the surface declares one.
            if method != DYNAMIC_CALL_METHOD && class.has_method(DYNAMIC_CALL_METHOD) {
                let packed = CallArgs::from_values(vec![
                    Value::Str(method.to_string()),
                    Value::List(args.snapshot()),
                ]);
                return dispatch(class, receiver, DYNAMIC_CALL_METHOD, packed);
            }
            return Err(MockError::UnknownMethod {
                class: class.name().to_string(),
                method: method.to_string(),
            });
        }
    };
    let signature = &synthesized.signature;

    // Trailing omitted parameters pick up their literal defaults.
    for param in signature.params.iter().skip(args.positional.len()) {
        if param.variadic {
            break;
        }
        match &param.default {
            ParamDefault::Literal(literal) => {
                args.push(ArgSlot::value(Value::from(literal.clone())));
            }
            _ => break,
        }
    }

    let info = match receiver {
        Some(instance) => instance.info(),
        None => Some(Arc::clone(class.static_info())),
    };
    let info = match info {
        Some(info) => info,
        // Detached: no recording, no stubbing; the call yields the
        // method's null/void default. A never-returning method still
        // raises.
        None => {
            return match &signature.ret {
                ReturnContract::Never => Err(MockError::NeverReturnInvoked {
                    method: method.to_string(),
                }),
                _ => Ok(Value::Null),
            };
        }
    };

    let resolved = info.invoke_chain(method, &args)?;
    let answer = resolved.current();

    let outcome = if answer.is_parent_delegate() {
        call_real(class, receiver, synthesized, method, &mut args)
    } else {
        answer.resolve(method, &mut args)
    };

    // The answer cursor advances exactly once per resolved call, even
    // when the answer raised.
    resolved.commit();
    let value = outcome?;

    match &signature.ret {
        ReturnContract::Never => Err(MockError::NeverReturnInvoked {
            method: method.to_string(),
        }),
        ReturnContract::Void => Ok(Value::Null),
        ReturnContract::Value(_) => Ok(value),
    }
}

/// Invoke the real ancestor implementation for a parent-delegate answer.
///
/// Interface-declared methods have no ancestor body to reach; they and
/// methods without a registered real implementation yield null.
fn call_real(
    class: &MockClass,
    receiver: Option<&MockInstance>,
    synthesized: &crate::synthesize::SynthesizedMethod,
    method: &str,
    args: &mut CallArgs,
) -> MockResult<Value> {
    if synthesized.from_interface {
        return Ok(Value::Null);
    }
    let real = match class.real_impl(method) {
        Some(real) => real,
        None => return Ok(Value::Null),
    };
    match receiver {
        Some(instance) => {
            let mut fields = instance.fields.lock();
            real(&mut fields, args)
        }
        None => {
            let mut scratch = FieldMap::default();
            real(&mut scratch, args)
        }
    }
}
