//! Integration test: every submitted task is delivered exactly once, on
//! the owning thread, with the fault its job produced.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use eddy_engine::{
    FnJob, Job, JobError, TaskFault, TaskHandle, TaskStatus, WorkerPool, WorkerPoolConfig,
};

type Boxed = FnJob<Box<dyn FnMut() -> Result<(), JobError> + Send>>;

// ── A job whose outcome is a function of its number ─────────────────

struct Numbered {
    id: usize,
    runs: usize,
}

impl Numbered {
    fn new(id: usize) -> Self {
        Self { id, runs: 0 }
    }

    fn expected_fault(id: usize) -> Option<TaskFault> {
        if id % 97 == 0 {
            Some(TaskFault::Panicked {
                message: format!("job {id} panicked"),
            })
        } else if id % 7 == 0 {
            Some(TaskFault::Failed(JobError::new(format!("job {id} failed"))))
        } else {
            None
        }
    }
}

impl Job for Numbered {
    fn run(&mut self) -> Result<(), JobError> {
        self.runs += 1;
        if self.id % 97 == 0 {
            panic!("job {} panicked", self.id);
        }
        if self.id % 7 == 0 {
            return Err(JobError::new(format!("job {} failed", self.id)));
        }
        Ok(())
    }
}

fn pool(workers: usize) -> WorkerPool<Numbered> {
    WorkerPool::new(WorkerPoolConfig::with_workers(workers)).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn thousand_tasks_delivered_exactly_once() {
    const TASKS: usize = 1000;
    let mut pool = pool(4);
    let handles: Vec<_> = (0..TASKS)
        .map(|id| pool.submit(Numbered::new(id)).unwrap())
        .collect();

    let owner = thread::current().id();
    let mut seen = vec![0usize; TASKS];
    let deadline = Instant::now() + Duration::from_secs(30);
    let mut delivered = 0;
    while delivered < TASKS && Instant::now() < deadline {
        delivered += pool
            .deliver_complete_with(|handle, job, fault| {
                assert_eq!(thread::current().id(), owner);
                assert_eq!(handle, handles[job.id]);
                assert_eq!(job.runs, 1, "job {} ran {} times", job.id, job.runs);
                assert_eq!(fault, Numbered::expected_fault(job.id), "job {}", job.id);
                seen[job.id] += 1;
            })
            .unwrap();
        thread::yield_now();
    }

    assert_eq!(delivered, TASKS);
    assert!(seen.iter().all(|&n| n == 1));
    assert!(handles.iter().all(|&h| pool.status(h) == TaskStatus::Retired));

    let m = pool.metrics();
    let panicked = (0..TASKS).filter(|i| i % 97 == 0).count() as u64;
    let failed = (0..TASKS).filter(|i| i % 97 != 0 && i % 7 == 0).count() as u64;
    assert_eq!(m.submitted, TASKS as u64);
    assert_eq!(m.delivered, TASKS as u64);
    assert_eq!(m.faulted, panicked + failed);
    assert_eq!(m.completed, TASKS as u64 - panicked - failed);
    assert_eq!(m.queued + m.running + m.awaiting_delivery, 0);
}

#[test]
fn work_starts_in_submission_order() {
    let mut pool: WorkerPool<Boxed> = WorkerPool::new(WorkerPoolConfig::with_workers(1)).unwrap();
    let started = Arc::new(Mutex::new(Vec::new()));
    let mut last = pool.wait_context();
    for id in 0..20 {
        let started = Arc::clone(&started);
        let wait = if id == 19 { Some(&mut last) } else { None };
        let job: Boxed = FnJob(Box::new(move || {
            started.lock().unwrap().push(id);
            Ok(())
        }));
        pool.add_task(job, None, wait).unwrap();
    }
    last.wait();
    assert_eq!(*started.lock().unwrap(), (0..20).collect::<Vec<_>>());
    assert_eq!(pool.deliver_complete().unwrap(), 20);
}

#[test]
fn dispose_fails_every_pending_task() {
    let mut pool: WorkerPool<Boxed> = WorkerPool::new(WorkerPoolConfig::with_workers(1)).unwrap();

    let (running_tx, running_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    pool.submit(FnJob(Box::new(move || {
        running_tx.send(()).ok();
        release_rx.lock().unwrap().recv().ok();
        Ok(())
    })))
    .unwrap();
    running_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    const PENDING: usize = 25;
    let disposed = Arc::new(AtomicUsize::new(0));
    let ran = Arc::new(AtomicUsize::new(0));
    for _ in 0..PENDING {
        let ran = Arc::clone(&ran);
        let disposed = Arc::clone(&disposed);
        pool.submit_with(
            FnJob(Box::new(move || {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })),
            move |_, _, fault| {
                if fault == Some(TaskFault::Disposed) {
                    disposed.fetch_add(1, Ordering::SeqCst);
                }
            },
        )
        .unwrap();
    }

    assert_eq!(pool.close(), PENDING);
    release_tx.send(()).unwrap();
    let report = pool.dispose().unwrap();

    assert_eq!(report.workers_joined, 1);
    assert_eq!(report.tasks_disposed, PENDING);
    assert_eq!(report.delivered, PENDING + 1);
    assert_eq!(disposed.load(Ordering::SeqCst), PENDING);
    assert_eq!(ran.load(Ordering::SeqCst), 0, "pending jobs must not run");
    assert_eq!(pool.metrics().disposed, PENDING as u64 + 1);
}

#[test]
fn drop_delivers_outstanding_callbacks() {
    let delivered = Arc::new(AtomicUsize::new(0));
    {
        let pool = pool(2);
        for id in 1..=10 {
            let delivered = Arc::clone(&delivered);
            pool.submit_with(Numbered::new(id * 11), move |_, _, _| {
                delivered.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
    }
    assert_eq!(delivered.load(Ordering::SeqCst), 10);
}

#[test]
fn waits_from_many_tasks_all_wake() {
    let mut pool = pool(3);
    let mut contexts = Vec::new();
    for id in 1..=12 {
        let mut ctx = pool.wait_context();
        pool.add_task(Numbered::new(id), None, Some(&mut ctx)).unwrap();
        contexts.push(ctx);
    }
    for ctx in contexts {
        assert!(ctx.wait_timeout(Duration::from_secs(5)));
    }
    assert_eq!(pool.metrics().awaiting_delivery, 12);
    assert_eq!(pool.deliver_complete().unwrap(), 12);
}

#[test]
fn panicking_callbacks_lose_no_completions() {
    let mut pool = pool(2);
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let mut contexts = Vec::new();
    for id in 1..=30 {
        let delivered = Arc::clone(&delivered);
        let mut ctx = pool.wait_context();
        pool.add_task(
            Numbered::new(id * 2 + 1),
            Some(Box::new(move |_, job: Numbered, _| {
                if job.id % 5 == 0 {
                    panic!("callback for {} refused", job.id);
                }
                delivered.lock().unwrap().push(job.id);
            })),
            Some(&mut ctx),
        )
        .unwrap();
        contexts.push(ctx);
    }
    for ctx in contexts {
        ctx.wait();
    }

    let mut panics = 0;
    loop {
        match pool.deliver_complete() {
            Ok(_) => break,
            Err(eddy_engine::DeliveryError::CallbackPanicked { message, .. }) => {
                assert!(message.contains("refused"));
                panics += 1;
            }
        }
    }
    // Ids 3, 5, ..., 61: the multiples of five are 5, 15, ..., 55.
    assert_eq!(panics, 6);
    assert_eq!(pool.metrics().delivered, 30);
    let mut ids = delivered.lock().unwrap().clone();
    ids.sort_unstable();
    let expected: Vec<usize> = (1..=30).map(|i| i * 2 + 1).filter(|id| id % 5 != 0).collect();
    assert_eq!(ids, expected);
    assert!(!pool.has_pending_delivery());
}

proptest::proptest! {
    #![proptest_config(proptest::prelude::ProptestConfig::with_cases(24))]

    #[test]
    fn dispose_at_any_point_delivers_each_task_once(
        workers in 1usize..5,
        tasks in 0usize..120,
        drained_before in 0usize..120,
    ) {
        let mut pool = pool(workers);
        for id in 0..tasks {
            pool.submit(Numbered::new(id)).unwrap();
        }

        let mut seen = vec![0usize; tasks];
        let mut visit = |_: TaskHandle, job: Numbered, fault: Option<TaskFault>| {
            if let Some(expected) = Numbered::expected_fault(job.id) {
                if fault != Some(TaskFault::Disposed) {
                    assert_eq!(fault, Some(expected));
                }
            }
            assert!(job.runs <= 1);
            seen[job.id] += 1;
        };
        let mut delivered = 0;
        while delivered < drained_before.min(tasks) {
            delivered += pool.deliver_complete_with(&mut visit).unwrap();
            thread::yield_now();
        }
        pool.shutdown();
        pool.deliver_complete_with(&mut visit).unwrap();

        proptest::prop_assert!(seen.iter().all(|&n| n == 1));
        let m = pool.metrics();
        proptest::prop_assert_eq!(m.delivered, tasks as u64);
        proptest::prop_assert_eq!(m.completed + m.faulted + m.disposed, tasks as u64);
    }
}
