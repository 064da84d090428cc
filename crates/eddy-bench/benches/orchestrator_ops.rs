//! Criterion benchmarks for request → compute → drain round trips.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use eddy_bench::{agent_goals, reference_map};
use eddy_engine::{
    FieldOrchestrator, FnJob, JobError, OrchestratorConfig, WorkerPool, WorkerPoolConfig,
};

type Boxed = FnJob<Box<dyn FnMut() -> Result<(), JobError> + Send>>;

fn bench_empty_task_round_trip(c: &mut Criterion) {
    let mut pool: WorkerPool<Boxed> = WorkerPool::new(WorkerPoolConfig::default()).unwrap();
    c.bench_function("worker_pool_256_empty_tasks", |b| {
        b.iter(|| {
            for _ in 0..256 {
                pool.submit(FnJob(Box::new(|| Ok(())))).unwrap();
            }
            let mut delivered = 0;
            while delivered < 256 {
                delivered += pool.update().unwrap();
            }
            black_box(delivered)
        });
    });
}

fn bench_agent_requests(c: &mut Criterion) {
    let map = reference_map(42);
    let dims = map.dims();
    let goals = agent_goals(&map, dims.width(), dims.height(), 64, 7);
    let mut o = FieldOrchestrator::spawn(
        Arc::new(map),
        WorkerPoolConfig::default(),
        OrchestratorConfig::new(dims),
    )
    .unwrap();

    let mut group = c.benchmark_group("orchestrator");
    group.sample_size(20);
    group.bench_function("64_agents_128x128", |b| {
        b.iter(|| {
            for &(agent, goal) in &goals {
                o.request_field(agent, goal).unwrap();
            }
            let mut installed = 0;
            while o.in_flight() > 0 {
                installed += o.drain_completed().unwrap().len();
            }
            black_box(installed)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_empty_task_round_trip, bench_agent_requests);
criterion_main!(benches);
