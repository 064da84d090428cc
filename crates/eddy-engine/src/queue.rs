//! State shared between a [`WorkerPool`](crate::WorkerPool) and its
//! worker threads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use eddy_arena::{SlotKey, Slab};

use crate::task::TaskRecord;
use crate::wait::WaitRegistry;

/// Everything guarded by the pool lock.
pub(crate) struct Queues<J> {
    pub(crate) records: Slab<TaskRecord<J>>,
    /// Submitted, not yet picked up. FIFO.
    pub(crate) work: VecDeque<SlotKey>,
    /// Finished, awaiting delivery on the owning thread. FIFO.
    pub(crate) complete: VecDeque<SlotKey>,
    /// Tasks currently held by a worker.
    pub(crate) running: usize,
    /// Set once by `close`; never cleared.
    pub(crate) closed: bool,
}

/// Monotonic counters, readable without the lock.
#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) submitted: AtomicU64,
    pub(crate) completed: AtomicU64,
    pub(crate) faulted: AtomicU64,
    pub(crate) disposed: AtomicU64,
    pub(crate) delivered: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

pub(crate) struct Shared<J> {
    queues: Mutex<Queues<J>>,
    /// Signalled when work is queued or the pool closes.
    pub(crate) work_ready: Condvar,
    /// Mirror of `complete.len()`, so `update()` can skip the lock.
    pub(crate) pending_delivery: AtomicUsize,
    pub(crate) counters: Counters,
    pub(crate) waits: Arc<WaitRegistry>,
}

impl<J> Shared<J> {
    pub(crate) fn new(initial_task_capacity: usize) -> Self {
        Self {
            queues: Mutex::new(Queues {
                records: Slab::with_capacity(initial_task_capacity),
                work: VecDeque::with_capacity(initial_task_capacity),
                complete: VecDeque::with_capacity(initial_task_capacity),
                running: 0,
                closed: false,
            }),
            work_ready: Condvar::new(),
            pending_delivery: AtomicUsize::new(0),
            counters: Counters::default(),
            waits: Arc::new(WaitRegistry::default()),
        }
    }

    /// Lock the queues. Jobs and callbacks never run under this lock,
    /// so a poisoned guard still holds consistent data.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Queues<J>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block on `work_ready`, tolerating poison like [`lock`](Self::lock).
    pub(crate) fn wait_for_work<'a>(
        &self,
        guard: MutexGuard<'a, Queues<J>>,
    ) -> MutexGuard<'a, Queues<J>> {
        self.work_ready
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the completed-list length. Call with the lock held.
    pub(crate) fn sync_pending(&self, queues: &Queues<J>) {
        self.pending_delivery
            .store(queues.complete.len(), Ordering::Release);
    }
}
