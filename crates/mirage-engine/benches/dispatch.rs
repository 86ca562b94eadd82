use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mirage_engine::{
    eq, MethodSignature, Mock, MockEngine, Param, TargetDescriptor, TypeConstraint, Value,
};

fn mock_with_stub() -> (MockEngine, Mock) {
    let engine = MockEngine::new();
    engine.register(
        TargetDescriptor::class("Calc").with_method(
            MethodSignature::new("add")
                .param(Param::new("x").typed(TypeConstraint::named("int")))
                .param(Param::new("y").typed(TypeConstraint::named("int")))
                .returns_type(TypeConstraint::named("int")),
        ),
    );
    let mock = engine.mock(&["Calc"]).unwrap();
    mock.when("add").with_args(vec![eq(1), eq(2)]).then_return(3);
    (engine, mock)
}

fn bench_stubbed_call(c: &mut Criterion) {
    let (_engine, mock) = mock_with_stub();
    c.bench_function("dispatch_stubbed_call", |b| {
        b.iter(|| {
            mock.call("add", black_box(vec![Value::Int(1), Value::Int(2)]))
                .unwrap()
        });
    });
}

fn bench_unstubbed_call(c: &mut Criterion) {
    let (_engine, mock) = mock_with_stub();
    c.bench_function("dispatch_unstubbed_call", |b| {
        b.iter(|| {
            mock.call("add", black_box(vec![Value::Int(8), Value::Int(9)]))
                .unwrap()
        });
    });
}

fn bench_assembly_cache_hit(c: &mut Criterion) {
    let (engine, _mock) = mock_with_stub();
    c.bench_function("assembly_cache_hit", |b| {
        b.iter(|| engine.mock(black_box(&["Calc"])).unwrap());
    });
}

criterion_group!(
    benches,
    bench_stubbed_call,
    bench_unstubbed_call,
    bench_assembly_cache_hit
);
criterion_main!(benches);
