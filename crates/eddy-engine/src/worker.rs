//! The loop each worker thread runs.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::job::{panic_message, Job, TaskFault};
use crate::queue::{Counters, Shared};
use crate::task::RecordState;

/// Run tasks until the pool closes and the work queue is empty.
///
/// Each iteration: wait for work → take the job out of its record →
/// run it outside the lock, catching panics → put the job back with its
/// fault → park the record on the completed list → wake any waiter.
pub(crate) fn worker_loop<J: Job>(shared: Arc<Shared<J>>, worker: usize) {
    debug!(worker, "worker started");
    loop {
        let (key, mut job) = {
            let mut q = shared.lock();
            let key = loop {
                if let Some(key) = q.work.pop_front() {
                    break key;
                }
                if q.closed {
                    debug!(worker, "worker exiting");
                    return;
                }
                q = shared.wait_for_work(q);
            };
            // More work queued: make sure another idle worker picks it up.
            if !q.work.is_empty() {
                shared.work_ready.notify_one();
            }
            let Some(record) = q.records.get_mut(key) else {
                continue;
            };
            let Some(job) = record.job.take() else {
                continue;
            };
            record.state = RecordState::Running;
            q.running += 1;
            (key, job)
        };

        trace!(worker, task = %key, "running task");
        let fault = match catch_unwind(AssertUnwindSafe(|| job.run())) {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(TaskFault::Failed(e)),
            Err(payload) => Some(TaskFault::Panicked {
                message: panic_message(&*payload),
            }),
        };
        if let Some(fault) = &fault {
            warn!(worker, task = %key, %fault, "task faulted");
        }

        let waiter = {
            let mut guard = shared.lock();
            let q = &mut *guard;
            q.running -= 1;
            let closed = q.closed;
            let Some(record) = q.records.get_mut(key) else {
                continue;
            };
            record.job = Some(job);
            record.fault = match fault {
                None if closed => Some(TaskFault::Disposed),
                other => other,
            };
            record.state = RecordState::Complete;
            match &record.fault {
                None => Counters::bump(&shared.counters.completed),
                Some(TaskFault::Disposed) => Counters::bump(&shared.counters.disposed),
                Some(_) => Counters::bump(&shared.counters.faulted),
            }
            let waiter = record.waiter.take();
            q.complete.push_back(key);
            shared.sync_pending(q);
            waiter
        };
        if let Some(ticket) = waiter {
            shared.waits.signal(ticket);
        }
    }
}
