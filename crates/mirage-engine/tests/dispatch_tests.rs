//! Integration tests for the per-call dispatch pipeline
//!
//! Tests cover:
//! - Unconditional recording and default answering
//! - Void and Never return contracts
//! - By-reference argument propagation and variadic tails
//! - Parent delegation to real implementations
//! - Static dispatch and the per-class static info
//! - Class caching per unique target set

use mirage_engine::{
    eq, shared, ArgSlot, CallArgs, ConstAnswer, CtorSpec, MethodSignature, MockEngine, MockError,
    MockOptions, Param, RealImpls, ReturnContract, TargetDescriptor, TypeConstraint, Value,
    DYNAMIC_CALL_METHOD,
};
use std::sync::Arc;

fn calculator_engine() -> MockEngine {
    let engine = MockEngine::new();
    engine.register(
        TargetDescriptor::class("Base").with_method(
            MethodSignature::new("add")
                .param(Param::new("x").typed(TypeConstraint::named("int")))
                .param(Param::new("y").typed(TypeConstraint::named("int")))
                .returns_type(TypeConstraint::named("int")),
        ),
    );
    engine.register(
        TargetDescriptor::interface("Countable")
            .with_method(MethodSignature::new("count").returns_type(TypeConstraint::named("int"))),
    );
    engine
}

#[test]
fn test_unstubbed_calls_are_recorded_and_default_answered() {
    let engine = calculator_engine();
    let mock = engine.mock(&["Base", "Countable"]).unwrap();

    for _ in 0..3 {
        assert_eq!(mock.call("count", vec![]).unwrap(), Value::Null);
    }
    assert_eq!(mock.verify("count").times(3).unwrap().len(), 3);
}

#[test]
fn test_example_scenario_base_plus_countable() {
    let engine = calculator_engine();
    let mock = engine
        .mock_with(
            &["Base", "Countable"],
            MockOptions::new().default_answer(Arc::new(ConstAnswer::new(0))),
        )
        .unwrap();

    // Unstubbed capability method falls to the default answer
    assert_eq!(mock.call("count", vec![]).unwrap(), Value::Int(0));

    mock.when("add")
        .with_args(vec![eq(1), eq(2)])
        .then_return(42);

    assert_eq!(
        mock.call("add", vec![Value::Int(1), Value::Int(2)]).unwrap(),
        Value::Int(42)
    );
    // Non-matching arguments fall to the default, not the stub
    assert_eq!(
        mock.call("add", vec![Value::Int(3), Value::Int(4)]).unwrap(),
        Value::Int(0)
    );
}

#[test]
fn test_void_contract_discards_stub_value() {
    let engine = MockEngine::new();
    engine.register(
        TargetDescriptor::class("Sink")
            .with_method(MethodSignature::new("drain").returns(ReturnContract::Void)),
    );

    let mock = engine.mock(&["Sink"]).unwrap();
    mock.when("drain").then_return(123);

    assert_eq!(mock.call("drain", vec![]).unwrap(), Value::Null);
    // The call still went through the pipeline
    mock.verify("drain").once().unwrap();
}

#[test]
fn test_never_contract_raises_even_when_stubbed() {
    let engine = MockEngine::new();
    engine.register(
        TargetDescriptor::class("Halting")
            .with_method(MethodSignature::new("halt").returns(ReturnContract::Never)),
    );

    let mock = engine.mock(&["Halting"]).unwrap();
    mock.when("halt").then_return(1);

    let err = mock.call("halt", vec![]).unwrap_err();
    assert_eq!(err, MockError::NeverReturnInvoked { method: "halt".into() });
    // The chain ran before the raise: the call is in history
    mock.verify("halt").once().unwrap();
}

#[test]
fn test_by_reference_mutations_reach_the_caller() {
    let engine = MockEngine::new();
    engine.register(
        TargetDescriptor::class("Parser").with_method(
            MethodSignature::new("parse")
                .param(Param::new("input").typed(TypeConstraint::named("string")))
                .param(Param::new("out").by_ref())
                .returns_type(TypeConstraint::named("bool")),
        ),
    );

    let mock = engine.mock(&["Parser"]).unwrap();
    mock.when("parse").then_answer(|_, args| {
        args.positional[1].set(Value::Int(42));
        Ok(Value::Bool(true))
    });

    let out = shared(Value::Null);
    let mut args = CallArgs::new();
    args.push(ArgSlot::value("42"));
    args.push(ArgSlot::reference(&out));

    assert_eq!(mock.call_args("parse", args).unwrap(), Value::Bool(true));
    assert_eq!(*out.lock(), Value::Int(42));

    // The recorded call sees the post-mutation value through the shared slot
    let history = mock.history();
    assert_eq!(history[0].arg(1), Some(Value::Int(42)));
}

#[test]
fn test_variadic_tail_positional_and_named() {
    let engine = MockEngine::new();
    engine.register(
        TargetDescriptor::class("Logger").with_method(
            MethodSignature::new("log")
                .param(Param::new("level").typed(TypeConstraint::named("string")))
                .param(Param::new("context").variadic()),
        ),
    );

    let mock = engine.mock(&["Logger"]).unwrap();
    let mut args = CallArgs::from_values(vec![
        Value::Str("info".into()),
        Value::Str("first".into()),
        Value::Str("second".into()),
    ]);
    args.push_named("source", ArgSlot::value("test"));
    mock.call_args("log", args).unwrap();

    let history = mock.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].arg_values().len(), 3);
    assert_eq!(history[0].args.get_named("source"), Some(Value::Str("test".into())));
}

#[test]
fn test_parent_delegation_runs_real_implementation() {
    let engine = MockEngine::new();
    engine.register_with_impls(
        TargetDescriptor::class("Calc").with_method(
            MethodSignature::new("add")
                .param(Param::new("x"))
                .param(Param::new("y"))
                .returns_type(TypeConstraint::named("int")),
        ),
        RealImpls::new().method("add", |_fields, args| {
            let x = args.get(0).and_then(|v| v.as_int()).unwrap_or(0);
            let y = args.get(1).and_then(|v| v.as_int()).unwrap_or(0);
            Ok(Value::Int(x + y))
        }),
    );

    let mock = engine.mock(&["Calc"]).unwrap();
    // Unstubbed: null default
    assert_eq!(
        mock.call("add", vec![Value::Int(2), Value::Int(3)]).unwrap(),
        Value::Null
    );

    mock.when("add").then_call_parent();
    assert_eq!(
        mock.call("add", vec![Value::Int(2), Value::Int(3)]).unwrap(),
        Value::Int(5)
    );
}

#[test]
fn test_parent_delegation_on_interface_method_yields_null() {
    let engine = MockEngine::new();
    engine.register(
        TargetDescriptor::interface("Countable")
            .with_method(MethodSignature::new("count").returns_type(TypeConstraint::named("int"))),
    );

    let mock = engine.mock(&["Countable"]).unwrap();
    mock.when("count").then_call_parent();
    assert_eq!(mock.call("count", vec![]).unwrap(), Value::Null);
}

#[test]
fn test_constructor_chaining_consumes_arguments_once() {
    let engine = MockEngine::new();
    engine.register_with_impls(
        TargetDescriptor::class("Conn")
            .with_constructor(CtorSpec::new(vec![Param::new("dsn")])),
        RealImpls::new().constructor(|fields, args| {
            fields.insert("dsn".to_string(), args.get(0).unwrap_or(Value::Null));
            Ok(Value::Null)
        }),
    );

    let with_args = engine
        .mock_with(
            &["Conn"],
            MockOptions::new().constructor_args(vec![Value::Str("db://x".into())]),
        )
        .unwrap();
    assert_eq!(
        with_args.instance().get_field("dsn"),
        Some(Value::Str("db://x".into()))
    );
    assert!(with_args.instance().constructor_args().is_none());

    // No arguments: the real constructor never runs
    let without_args = engine.mock(&["Conn"]).unwrap();
    assert!(without_args.instance().get_field("dsn").is_none());
}

#[test]
fn test_unknown_method_reroutes_through_dynamic_entry() {
    let engine = MockEngine::new();
    engine.register(
        TargetDescriptor::class("Dyn").with_method(
            MethodSignature::new(DYNAMIC_CALL_METHOD)
                .param(Param::new("name").typed(TypeConstraint::named("string")))
                .param(Param::new("arguments").typed(TypeConstraint::named("list"))),
        ),
    );

    let mock = engine.mock(&["Dyn"]).unwrap();
    mock.call("conjure", vec![Value::Int(1), Value::Int(2)]).unwrap();

    // Primary channel recorded the __call; dynamic channel the real name
    let primary = mock.history();
    assert_eq!(primary.len(), 1);
    assert_eq!(primary[0].method, DYNAMIC_CALL_METHOD);

    let dynamic = mock.dynamic_history();
    assert_eq!(dynamic.len(), 1);
    assert_eq!(dynamic[0].method, "conjure");
    assert_eq!(dynamic[0].arg_values(), vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn test_static_dispatch_uses_per_class_info() {
    let engine = MockEngine::new();
    engine.register(
        TargetDescriptor::class("Registry").with_method(
            MethodSignature::new("instance")
                .static_method()
                .returns_type(TypeConstraint::named("Registry")),
        ),
    );

    let statics = engine.statics(&["Registry"]).unwrap();
    statics.when("instance").then_return("the-singleton");
    assert_eq!(
        statics.call("instance", vec![]).unwrap(),
        Value::Str("the-singleton".into())
    );
    statics.verify("instance").once().unwrap();

    // Instance-side info is independent of the static info
    let mock = engine.mock(&["Registry"]).unwrap();
    assert!(mock.history().is_empty());
    assert_eq!(statics.history().len(), 1);
}

#[test]
fn test_same_target_set_reuses_generated_class() {
    let engine = calculator_engine();
    let a = engine.mock(&["Base", "Countable"]).unwrap();
    let b = engine.mock(&["Countable", "Base"]).unwrap();
    let c = engine.mock(&["Base"]).unwrap();

    assert!(Arc::ptr_eq(a.class(), b.class()));
    assert!(!Arc::ptr_eq(a.class(), c.class()));

    // Same class, but each instance owns its history
    a.call("add", vec![Value::Int(1), Value::Int(2)]).unwrap();
    assert_eq!(a.history().len(), 1);
    assert!(b.history().is_empty());
}
