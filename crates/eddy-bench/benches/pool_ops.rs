//! Criterion micro-benchmarks for slab and object pool churn.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use eddy_arena::{Growth, ObjectPool, Slab};
use eddy_core::GridDims;
use eddy_field::FlowField;

fn bench_slab_churn(c: &mut Criterion) {
    let mut slab: Slab<u64> = Slab::with_capacity(1024);
    let mut keys = Vec::with_capacity(1024);
    c.bench_function("slab_insert_remove_1k", |b| {
        b.iter(|| {
            for i in 0..1024u64 {
                keys.push(slab.insert(i));
            }
            for key in keys.drain(..) {
                black_box(slab.remove(key));
            }
        });
    });
}

fn bench_field_pool_churn(c: &mut Criterion) {
    let dims = GridDims::new(128, 128).unwrap();
    let mut pool = ObjectPool::new(64, Growth::Fixed, move || FlowField::new(dims));
    let mut handles = Vec::with_capacity(64);
    c.bench_function("field_pool_allocate_release_64", |b| {
        b.iter(|| {
            while let Some(h) = pool.allocate() {
                handles.push(h);
            }
            for h in handles.drain(..) {
                pool.deallocate(h);
            }
            black_box(pool.available())
        });
    });
}

fn bench_detach_attach(c: &mut Criterion) {
    let dims = GridDims::new(128, 128).unwrap();
    let mut pool = ObjectPool::new(1, Growth::Fixed, move || FlowField::new(dims));
    let handle = pool.allocate().unwrap();
    c.bench_function("field_pool_detach_attach", |b| {
        b.iter(|| {
            let field = pool.detach(handle);
            pool.attach(handle, black_box(field));
        });
    });
}

criterion_group!(
    benches,
    bench_slab_churn,
    bench_field_pool_churn,
    bench_detach_attach
);
criterion_main!(benches);
