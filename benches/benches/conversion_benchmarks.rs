//! Conversion Benchmarks
//!
//! Cost of interpreting generic handles as capability views, for inputs that
//! convert and inputs that degrade to the empty view.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pyglu::{Boolean, Callable, Convert, Handle, SimRuntime};

fn bench_boolean_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_convert");
    let int = unsafe { Handle::<SimRuntime>::from_owned(SimRuntime::new_int(42)) };
    let raises = unsafe { Handle::<SimRuntime>::from_owned(SimRuntime::new_opaque(None)) };

    group.bench_function("definite", |b| {
        b.iter(|| black_box(Boolean::convert(black_box(&int))))
    });
    group.bench_function("indeterminate", |b| {
        b.iter(|| black_box(Boolean::convert(black_box(&raises))))
    });

    group.finish();
}

fn bench_callable_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("callable_convert");
    let function = unsafe { Handle::<SimRuntime>::from_owned(SimRuntime::new_function("f")) };
    let method = unsafe {
        Handle::<SimRuntime>::from_owned(SimRuntime::new_instance_method(function.as_ptr()))
    };
    let int = unsafe { Handle::<SimRuntime>::from_owned(SimRuntime::new_int(1)) };
    let bound = unsafe {
        Handle::<SimRuntime>::from_owned(SimRuntime::new_bound_method(
            function.as_ptr(),
            int.as_ptr(),
        ))
    };

    group.bench_function("instance_method", |b| {
        b.iter(|| black_box(Callable::convert(black_box(&method))))
    });
    group.bench_function("bound_method", |b| {
        b.iter(|| black_box(Callable::convert(black_box(&bound))))
    });
    // Neither a function nor an int is a method shape; both come back empty.
    group.bench_function("plain_function", |b| {
        b.iter(|| black_box(Callable::convert(black_box(&function))))
    });
    group.bench_function("int", |b| {
        b.iter(|| black_box(Callable::convert(black_box(&int))))
    });

    group.finish();
}

criterion_group!(benches, bench_boolean_convert, bench_callable_convert);
criterion_main!(benches);
