//! Criterion micro-benchmarks for the three flow-field stages.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use eddy_bench::{reference_map, stress_map};
use eddy_core::Cell;
use eddy_field::FlowField;
use eddy_test_utils::open_grid;

fn bench_calculate_open_32(c: &mut Criterion) {
    let map = open_grid(32, 32);
    let dims = map.dims();
    let mut field = FlowField::new(dims);
    c.bench_function("calculate_open_32x32", |b| {
        b.iter(|| {
            field.calculate(&map, black_box(Cell::new(16, 16)), dims);
            black_box(field.flows().len())
        });
    });
}

fn bench_calculate_reference(c: &mut Criterion) {
    let map = reference_map(42);
    let dims = map.dims();
    let mut field = FlowField::new(dims);
    c.bench_function("calculate_reference_128x128", |b| {
        b.iter(|| {
            field.calculate(&map, black_box(Cell::new(64, 64)), dims);
            black_box(field.max_integration())
        });
    });
}

fn bench_calculate_stress(c: &mut Criterion) {
    let map = stress_map(42);
    let dims = map.dims();
    let mut field = FlowField::new(dims);
    let mut group = c.benchmark_group("stress");
    group.sample_size(20);
    group.bench_function("calculate_255x255", |b| {
        b.iter(|| {
            field.calculate(&map, black_box(Cell::new(0, 0)), dims);
            black_box(field.max_integration())
        });
    });
    group.finish();
}

fn bench_flow_lookup(c: &mut Criterion) {
    let map = reference_map(42);
    let dims = map.dims();
    let mut field = FlowField::new(dims);
    field.calculate(&map, Cell::new(64, 64), dims);
    c.bench_function("flow_at_world_10k", |b| {
        b.iter(|| {
            let mut sum = 0i32;
            for i in 0..10_000u32 {
                let x = (i % 128) as f32 * 16.0 + 3.5;
                let y = (i / 128 % 128) as f32 * 16.0 + 3.5;
                let v = field.flow_at_world(black_box(x), black_box(y), 16.0);
                sum += i32::from(v.x) + i32::from(v.y);
            }
            black_box(sum)
        });
    });
}

criterion_group!(
    benches,
    bench_calculate_open_32,
    bench_calculate_reference,
    bench_calculate_stress,
    bench_flow_lookup
);
criterion_main!(benches);
