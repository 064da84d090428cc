//! A fixed set of worker threads whose completions are delivered on the
//! thread that owns the pool.
//!
//! Submission ([`add_task`](WorkerPool::add_task)) and inspection take
//! `&self`. Delivery ([`deliver_complete`](WorkerPool::deliver_complete),
//! [`update`](WorkerPool::update)) and disposal take `&mut self`; worker
//! threads only ever see the shared queue, never the pool, so completion
//! callbacks cannot run anywhere but on the owner.

use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use eddy_arena::SlotKey;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, WorkerPoolConfig};
use crate::job::{panic_message, Job, TaskFault};
use crate::metrics::PoolMetrics;
use crate::queue::{Counters, Shared};
use crate::task::{Completion, RecordState, TaskHandle, TaskRecord, TaskStatus};
use crate::wait::WaitContext;
use crate::worker::worker_loop;

// ── SubmitError ──────────────────────────────────────────────────

/// Submission was refused. Carries the job back to the caller.
pub enum SubmitError<J> {
    /// The pool has been closed or disposed.
    Disposed(J),
}

impl<J> SubmitError<J> {
    /// Recover the rejected job.
    pub fn into_job(self) -> J {
        match self {
            Self::Disposed(job) => job,
        }
    }
}

impl<J> fmt::Debug for SubmitError<J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disposed(_) => f.write_str("Disposed(..)"),
        }
    }
}

impl<J> fmt::Display for SubmitError<J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disposed(_) => write!(f, "worker pool has been disposed"),
        }
    }
}

impl<J> Error for SubmitError<J> {}

// ── DeliveryError ────────────────────────────────────────────────

/// A drain stopped early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryError {
    /// A completion callback panicked. The completions not yet delivered
    /// were put back at the front of the completed list and will be
    /// delivered by the next drain.
    CallbackPanicked {
        /// The panic payload, if it was a string.
        message: String,
        /// Completions returned to the completed list.
        requeued: usize,
    },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CallbackPanicked { message, requeued } => write!(
                f,
                "completion callback panicked ({message}); {requeued} completions requeued"
            ),
        }
    }
}

impl Error for DeliveryError {}

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`WorkerPool::shutdown`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Number of worker threads joined.
    pub workers_joined: usize,
    /// Queued tasks failed with [`TaskFault::Disposed`] without running.
    pub tasks_disposed: usize,
    /// Completions delivered during shutdown.
    pub delivered: usize,
}

// ── ShutdownState ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownState {
    Running,
    Closed,
    Joined,
}

// ── WorkerPool ───────────────────────────────────────────────────

/// Runs [`Job`]s on background threads and hands them back on the
/// owning thread.
///
/// Work is taken strictly in submission order; completion order across
/// workers is unspecified. A task's completion callback (or, without
/// one, the visitor passed to
/// [`deliver_complete_with`](Self::deliver_complete_with)) runs exactly
/// once, on whichever thread calls the drain.
pub struct WorkerPool<J: Job> {
    shared: Arc<Shared<J>>,
    threads: Vec<JoinHandle<()>>,
    /// Completed keys being delivered; reused across drains.
    draining: VecDeque<SlotKey>,
    workers: usize,
    state: ShutdownState,
    /// Queued tasks failed by `close`, for the shutdown report.
    closed_queued: usize,
}

impl<J: Job> WorkerPool<J> {
    /// Spawn the worker threads.
    pub fn new(config: WorkerPoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let workers = config.resolved_worker_count();
        let shared = Arc::new(Shared::new(config.initial_task_capacity));

        let mut threads = Vec::with_capacity(workers);
        for i in 0..workers {
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("{}-{i}", config.thread_name_prefix))
                .spawn(move || worker_loop(worker_shared, i));
            match spawned {
                Ok(handle) => threads.push(handle),
                Err(e) => {
                    shared.lock().closed = true;
                    shared.work_ready.notify_all();
                    for handle in threads {
                        let _ = handle.join();
                    }
                    return Err(ConfigError::ThreadSpawnFailed {
                        reason: format!("worker {i}: {e}"),
                    });
                }
            }
        }
        info!(workers, prefix = %config.thread_name_prefix, "worker pool started");

        Ok(Self {
            shared,
            threads,
            draining: VecDeque::with_capacity(config.initial_task_capacity),
            workers,
            state: ShutdownState::Running,
            closed_queued: 0,
        })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queue `job` for execution.
    ///
    /// `completion`, if given, runs on the owning thread when the task is
    /// delivered. `wait`, if given, is signalled when the task finishes
    /// running; it must not already be bound to another task.
    ///
    /// Fails with [`SubmitError::Disposed`] once the pool is closed.
    ///
    /// # Panics
    ///
    /// Panics if `wait` was checked out of a different pool; its slot
    /// would never be signalled.
    pub fn add_task(
        &self,
        job: J,
        completion: Option<Completion<J>>,
        wait: Option<&mut WaitContext>,
    ) -> Result<TaskHandle, SubmitError<J>> {
        if let Some(ctx) = &wait {
            assert!(
                ctx.is_from(&self.shared.waits),
                "WaitContext belongs to a different WorkerPool"
            );
        }
        let mut q = self.shared.lock();
        if q.closed {
            return Err(SubmitError::Disposed(job));
        }
        let waiter = wait.map(WaitContext::bind);
        let key = q.records.insert(TaskRecord::queued(job, completion, waiter));
        q.work.push_back(key);
        drop(q);

        Counters::bump(&self.shared.counters.submitted);
        self.shared.work_ready.notify_one();
        Ok(TaskHandle(key))
    }

    /// Queue `job` with no callback; it is delivered to the drain's visitor.
    pub fn submit(&self, job: J) -> Result<TaskHandle, SubmitError<J>> {
        self.add_task(job, None, None)
    }

    /// Queue `job` with a completion closure.
    pub fn submit_with<F>(&self, job: J, completion: F) -> Result<TaskHandle, SubmitError<J>>
    where
        F: FnOnce(TaskHandle, J, Option<TaskFault>) + Send + 'static,
    {
        self.add_task(job, Some(Box::new(completion)), None)
    }

    /// Check out a reusable wait context for [`add_task`](Self::add_task).
    pub fn wait_context(&self) -> WaitContext {
        self.shared.waits.checkout()
    }

    /// Where `handle`'s task is in its lifecycle.
    pub fn status(&self, handle: TaskHandle) -> TaskStatus {
        self.shared
            .lock()
            .records
            .get(handle.0)
            .map_or(TaskStatus::Retired, TaskRecord::status)
    }

    /// Whether any completions are parked for delivery. Lock-free.
    pub fn has_pending_delivery(&self) -> bool {
        self.shared.pending_delivery.load(Ordering::Acquire) > 0
    }

    /// Deliver parked completions if there are any.
    ///
    /// The per-frame entry point: costs one atomic load when nothing
    /// has finished.
    pub fn update(&mut self) -> Result<usize, DeliveryError> {
        if !self.has_pending_delivery() {
            return Ok(0);
        }
        self.deliver_complete()
    }

    /// Deliver every parked completion, running each task's callback.
    /// Tasks submitted without a callback are dropped.
    ///
    /// Returns the number delivered.
    pub fn deliver_complete(&mut self) -> Result<usize, DeliveryError> {
        self.deliver_complete_with(|_, _, _| {})
    }

    /// Deliver every parked completion. Tasks with a callback run it;
    /// the rest are passed to `visitor`.
    ///
    /// The completed list is swapped out under the lock, then each
    /// callback runs with no lock held, so callbacks may submit new
    /// tasks. A task's record slot is released before its callback runs.
    ///
    /// If a callback panics the drain stops, the remaining completions
    /// are requeued ahead of anything completed meanwhile, and
    /// [`DeliveryError::CallbackPanicked`] is returned.
    pub fn deliver_complete_with<F>(&mut self, mut visitor: F) -> Result<usize, DeliveryError>
    where
        F: FnMut(TaskHandle, J, Option<TaskFault>),
    {
        {
            let mut q = self.shared.lock();
            std::mem::swap(&mut q.complete, &mut self.draining);
            self.shared.sync_pending(&q);
        }

        let mut delivered = 0;
        while let Some(key) = self.draining.pop_front() {
            let record = self.shared.lock().records.remove(key);
            let Some(TaskRecord {
                job: Some(job),
                completion,
                fault,
                ..
            }) = record
            else {
                continue;
            };
            let handle = TaskHandle(key);

            let outcome = catch_unwind(AssertUnwindSafe(|| match completion {
                Some(callback) => callback(handle, job, fault),
                None => visitor(handle, job, fault),
            }));
            delivered += 1;
            Counters::bump(&self.shared.counters.delivered);

            if let Err(payload) = outcome {
                let message = panic_message(&*payload);
                let requeued = self.draining.len();
                {
                    let mut q = self.shared.lock();
                    while let Some(rest) = self.draining.pop_back() {
                        q.complete.push_front(rest);
                    }
                    self.shared.sync_pending(&q);
                }
                warn!(task = %handle, %message, requeued, "completion callback panicked");
                return Err(DeliveryError::CallbackPanicked { message, requeued });
            }
        }
        Ok(delivered)
    }

    /// Stop accepting work and fail every queued task with
    /// [`TaskFault::Disposed`]. Running tasks finish and are parked with
    /// the same fault. Returns the number of queued tasks failed.
    ///
    /// Idempotent. Completions are still delivered by the next drain.
    pub fn close(&mut self) -> usize {
        if self.state != ShutdownState::Running {
            return 0;
        }
        self.state = ShutdownState::Closed;

        let mut waiters = Vec::new();
        let failed = {
            let mut guard = self.shared.lock();
            let q = &mut *guard;
            q.closed = true;
            let mut failed = 0;
            while let Some(key) = q.work.pop_front() {
                if let Some(record) = q.records.get_mut(key) {
                    record.fault = Some(TaskFault::Disposed);
                    record.state = RecordState::Complete;
                    waiters.extend(record.waiter.take());
                    Counters::bump(&self.shared.counters.disposed);
                    q.complete.push_back(key);
                    failed += 1;
                }
            }
            self.shared.sync_pending(q);
            failed
        };
        self.shared.work_ready.notify_all();
        for ticket in waiters {
            self.shared.waits.signal(ticket);
        }
        self.closed_queued = failed;
        debug!(failed, "worker pool closed");
        failed
    }

    /// Close the pool and join every worker thread, without delivering.
    ///
    /// Completions parked by the shutdown stay queued for the owner to
    /// drain, so it can reclaim whatever the jobs carry.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.state == ShutdownState::Joined {
            return ShutdownReport::default();
        }
        let start = Instant::now();
        self.close();
        let tasks_disposed = self.closed_queued;

        let mut workers_joined = 0;
        for handle in self.threads.drain(..) {
            if handle.join().is_ok() {
                workers_joined += 1;
            }
        }
        self.state = ShutdownState::Joined;

        let total_ms = start.elapsed().as_millis() as u64;
        info!(workers_joined, tasks_disposed, total_ms, "worker pool shut down");
        ShutdownReport {
            total_ms,
            workers_joined,
            tasks_disposed,
            delivered: 0,
        }
    }

    /// [`shutdown`](Self::shutdown), then deliver every remaining
    /// completion through the normal path.
    pub fn dispose(&mut self) -> Result<ShutdownReport, DeliveryError> {
        let mut report = self.shutdown();
        report.delivered = self.deliver_complete()?;
        Ok(report)
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.state != ShutdownState::Running
    }

    /// Snapshot of the pool's counters and queue depths.
    pub fn metrics(&self) -> PoolMetrics {
        let (queued, running, awaiting_delivery) = {
            let q = self.shared.lock();
            (q.work.len(), q.running, q.complete.len())
        };
        let c = &self.shared.counters;
        PoolMetrics {
            workers: self.workers,
            submitted: c.submitted.load(Ordering::Relaxed),
            completed: c.completed.load(Ordering::Relaxed),
            faulted: c.faulted.load(Ordering::Relaxed),
            disposed: c.disposed.load(Ordering::Relaxed),
            delivered: c.delivered.load(Ordering::Relaxed),
            queued,
            running,
            awaiting_delivery: awaiting_delivery + self.draining.len(),
        }
    }
}

impl<J: Job> Drop for WorkerPool<J> {
    fn drop(&mut self) {
        if self.state == ShutdownState::Joined && !self.has_pending_delivery() {
            return;
        }
        if let Err(e) = self.dispose() {
            warn!(error = %e, "completion delivery failed while dropping worker pool");
        }
    }
}

impl<J: Job> fmt::Debug for WorkerPool<J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// Compile-time assertion: a pool can be handed to another thread and
// submitted to through a shared reference.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<WorkerPool<crate::job::FnJob<fn() -> Result<(), crate::JobError>>>>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{FnJob, JobError};
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Duration;

    type Boxed = FnJob<Box<dyn FnMut() -> Result<(), JobError> + Send>>;

    fn job(f: impl FnMut() -> Result<(), JobError> + Send + 'static) -> Boxed {
        FnJob(Box::new(f))
    }

    fn pool(workers: usize) -> WorkerPool<Boxed> {
        WorkerPool::new(WorkerPoolConfig::with_workers(workers)).unwrap()
    }

    /// Drain until `want` completions have been delivered or 5s pass.
    fn drain_until(pool: &mut WorkerPool<Boxed>, want: usize) -> usize {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = 0;
        while got < want && Instant::now() < deadline {
            got += pool.update().unwrap();
            thread::yield_now();
        }
        got
    }

    #[test]
    fn completion_runs_on_owning_thread() {
        let mut pool = pool(2);
        let owner = thread::current().id();
        let (tx, rx) = mpsc::channel();
        pool.submit_with(job(|| Ok(())), move |_, _, fault| {
            tx.send((thread::current().id(), fault)).unwrap();
        })
        .unwrap();
        assert_eq!(drain_until(&mut pool, 1), 1);
        let (ran_on, fault) = rx.try_recv().unwrap();
        assert_eq!(ran_on, owner);
        assert!(fault.is_none());
    }

    #[test]
    fn completions_wait_for_a_drain() {
        let mut pool = pool(1);
        let delivered = Arc::new(AtomicUsize::new(0));
        let d = Arc::clone(&delivered);
        let mut ctx = pool.wait_context();
        let h = pool
            .add_task(
                job(|| Ok(())),
                Some(Box::new(move |_, _, _| {
                    d.fetch_add(1, Ordering::SeqCst);
                })),
                Some(&mut ctx),
            )
            .unwrap();
        ctx.wait();
        assert_eq!(pool.status(h), TaskStatus::AwaitingDelivery);
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
        assert!(pool.has_pending_delivery());

        assert_eq!(pool.deliver_complete().unwrap(), 1);
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        assert_eq!(pool.status(h), TaskStatus::Retired);
    }

    #[test]
    fn job_error_and_panic_become_faults() {
        let mut pool = pool(2);
        pool.submit(job(|| Err(JobError::new("bad input")))).unwrap();
        pool.submit(job(|| panic!("boom"))).unwrap();

        let mut faults = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while faults.len() < 2 && Instant::now() < deadline {
            pool.deliver_complete_with(|_, _, fault| faults.push(fault))
                .unwrap();
            thread::yield_now();
        }
        assert_eq!(faults.len(), 2);
        assert!(faults.contains(&Some(TaskFault::Failed(JobError::new("bad input")))));
        assert!(faults.contains(&Some(TaskFault::Panicked {
            message: "boom".into()
        })));

        // Workers survived the panic.
        pool.submit(job(|| Ok(()))).unwrap();
        assert_eq!(drain_until(&mut pool, 1), 1);
        assert_eq!(pool.metrics().faulted, 2);
    }

    #[test]
    fn update_is_noop_when_idle() {
        let mut pool = pool(1);
        assert_eq!(pool.update().unwrap(), 0);
        assert!(!pool.has_pending_delivery());
    }

    #[test]
    fn submit_after_close_returns_job() {
        let mut pool = pool(1);
        pool.close();
        let err = pool.submit(job(|| Ok(()))).unwrap_err();
        assert_eq!(err.to_string(), "worker pool has been disposed");
        let _job: Boxed = err.into_job();
    }

    #[test]
    fn close_fails_queued_tasks() {
        let mut pool = pool(1);
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let gate_rx = std::sync::Mutex::new(gate_rx);
        let mut started = pool.wait_context();
        // Occupy the only worker.
        let (running_tx, running_rx) = mpsc::channel::<()>();
        pool.submit(job(move || {
            running_tx.send(()).ok();
            gate_rx.lock().unwrap().recv().ok();
            Ok(())
        }))
        .unwrap();
        running_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let queued = pool
            .add_task(job(|| Ok(())), None, Some(&mut started))
            .unwrap();
        assert_eq!(pool.status(queued), TaskStatus::Queued);

        assert_eq!(pool.close(), 1);
        // The queued task's waiter is woken even though it never ran.
        assert!(started.wait_timeout(Duration::from_secs(5)));
        gate_tx.send(()).unwrap();

        let report = pool.shutdown();
        assert_eq!(report.workers_joined, 1);
        assert_eq!(report.tasks_disposed, 1);

        let mut faults = Vec::new();
        pool.deliver_complete_with(|_, _, f| faults.push(f)).unwrap();
        // The running task finished after close, so it is disposed too.
        assert_eq!(faults, vec![Some(TaskFault::Disposed); 2]);
    }

    #[test]
    fn callback_panic_requeues_rest() {
        let mut pool = pool(1);
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut last = pool.wait_context();
        for i in 0..3 {
            let order = Arc::clone(&order);
            let completion: Completion<Boxed> = Box::new(move |_, _, _| {
                if i == 0 {
                    panic!("first callback");
                }
                order.lock().unwrap().push(i);
            });
            let wait = if i == 2 { Some(&mut last) } else { None };
            pool.add_task(job(|| Ok(())), Some(completion), wait).unwrap();
        }
        // One worker runs tasks in order, so all three are parked.
        last.wait();

        let err = pool.deliver_complete().unwrap_err();
        assert_eq!(
            err,
            DeliveryError::CallbackPanicked {
                message: "first callback".into(),
                requeued: 2
            }
        );
        assert!(pool.has_pending_delivery());
        assert_eq!(pool.deliver_complete().unwrap(), 2);
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn queue_lock_is_free_during_callbacks() {
        let mut pool = pool(2);
        let inner = Arc::new(AtomicUsize::new(0));
        let shared = Arc::clone(&pool.shared);
        let counter = Arc::clone(&inner);
        pool.submit_with(job(|| Ok(())), move |_, _, _| {
            let q = shared.lock();
            assert!(!q.closed);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(drain_until(&mut pool, 1), 1);
        assert_eq!(inner.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut pool = pool(3);
        let first = pool.dispose().unwrap();
        assert_eq!(first.workers_joined, 3);
        assert!(pool.is_closed());
        let second = pool.dispose().unwrap();
        assert_eq!(second.workers_joined, 0);
    }

    #[test]
    fn record_slots_are_recycled() {
        let mut pool = pool(2);
        for _ in 0..50 {
            let mut ctx = pool.wait_context();
            pool.add_task(job(|| Ok(())), None, Some(&mut ctx)).unwrap();
            ctx.wait();
            pool.deliver_complete().unwrap();
        }
        assert!(pool.shared.lock().records.slots() <= 2);
        let m = pool.metrics();
        assert_eq!(m.submitted, 50);
        assert_eq!(m.delivered, 50);
        assert_eq!(m.queued + m.running + m.awaiting_delivery, 0);
    }

    #[test]
    #[should_panic(expected = "different WorkerPool")]
    fn wait_context_from_another_pool_is_rejected() {
        let a = pool(1);
        let b = pool(1);
        let mut ctx = a.wait_context();
        let _ = b.add_task(job(|| Ok(())), None, Some(&mut ctx));
    }

    #[test]
    fn rejected_foreign_context_stays_unbound() {
        let a = pool(1);
        let b = pool(1);
        let mut ctx = a.wait_context();
        let refused = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = b.add_task(job(|| Ok(())), None, Some(&mut ctx));
        }));
        assert!(refused.is_err());
        assert!(!ctx.is_bound());
        assert_eq!(b.metrics().submitted, 0);
        assert!(!b.shared.lock().closed);
    }

    #[test]
    fn threads_are_named() {
        let mut pool = WorkerPool::new(WorkerPoolConfig {
            worker_count: Some(1),
            thread_name_prefix: "nav".into(),
            initial_task_capacity: 4,
        })
        .unwrap();
        let (tx, rx) = mpsc::channel();
        let tx = std::sync::Mutex::new(tx);
        pool.submit(job(move || {
            let name = thread::current().name().map(str::to_owned);
            tx.lock().unwrap().send(name).ok();
            Ok(())
        }))
        .unwrap();
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("nav-0"));
        pool.dispose().unwrap();
    }
}
