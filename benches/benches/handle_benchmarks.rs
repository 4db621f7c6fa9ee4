//! Handle Benchmarks
//!
//! Cost of the ownership primitive itself: borrow/drop pairs, clones, moves
//! and the construct-then-swap assignment path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pyglu::{Handle, Runtime, SimRuntime};

type H = Handle<SimRuntime>;

fn bench_borrow_drop(c: &mut Criterion) {
    let obj = SimRuntime::new_int(1);

    c.bench_function("handle_borrow_drop", |b| {
        b.iter(|| {
            let h = unsafe { H::from_borrowed(black_box(obj)) };
            black_box(&h);
        })
    });

    unsafe { SimRuntime::decref(obj) };
}

fn bench_clone_family(c: &mut Criterion) {
    let mut group = c.benchmark_group("handle_clone_family");
    let root = unsafe { H::from_owned(SimRuntime::new_int(1)) };

    for size in [1usize, 16, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let family: Vec<H> = (0..size).map(|_| root.clone()).collect();
                black_box(family)
            })
        });
    }

    group.finish();
}

fn bench_take_and_assign(c: &mut Criterion) {
    let x = unsafe { H::from_owned(SimRuntime::new_int(1)) };
    let y = unsafe { H::from_owned(SimRuntime::new_int(2)) };

    c.bench_function("handle_take", |b| {
        b.iter(|| {
            let mut a = x.clone();
            let moved = a.take();
            black_box((a, moved))
        })
    });

    c.bench_function("handle_clone_from", |b| {
        let mut target = x.clone();
        b.iter(|| {
            target.clone_from(black_box(&y));
            target.clone_from(black_box(&x));
        })
    });
}

criterion_group!(
    benches,
    bench_borrow_drop,
    bench_clone_family,
    bench_take_and_assign
);
criterion_main!(benches);
