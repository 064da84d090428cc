//! Task handles, status, and the records the pool keeps per task.

use std::fmt;

use eddy_arena::SlotKey;

use crate::job::TaskFault;
use crate::wait::WaitTicket;

/// Callback run on the owning thread when a task is delivered.
///
/// Receives the task's handle, the job value back, and the fault if the
/// job did not complete normally. Stored alongside the task until
/// delivery, so it must be `Send`, but it never runs on a worker.
pub type Completion<J> = Box<dyn FnOnce(TaskHandle, J, Option<TaskFault>) + Send>;

/// Identifies a submitted task until it is delivered.
///
/// Handles are generational: once a task is delivered its record slot is
/// reused, and the old handle reports [`TaskStatus::Retired`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub(crate) SlotKey);

impl TaskHandle {
    /// The underlying record key.
    pub fn key(&self) -> SlotKey {
        self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {}", self.0)
    }
}

/// Where a task is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Waiting for a worker.
    Queued,
    /// A worker is executing it.
    Running,
    /// Finished (or faulted) and parked until the owner drains.
    AwaitingDelivery,
    /// Delivered, or never issued by this pool.
    Retired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RecordState {
    Queued,
    Running,
    Complete,
}

pub(crate) struct TaskRecord<J> {
    /// `None` while a worker holds the job.
    pub(crate) job: Option<J>,
    pub(crate) completion: Option<Completion<J>>,
    pub(crate) fault: Option<TaskFault>,
    pub(crate) waiter: Option<WaitTicket>,
    pub(crate) state: RecordState,
}

impl<J> TaskRecord<J> {
    pub(crate) fn queued(
        job: J,
        completion: Option<Completion<J>>,
        waiter: Option<WaitTicket>,
    ) -> Self {
        Self {
            job: Some(job),
            completion,
            fault: None,
            waiter,
            state: RecordState::Queued,
        }
    }

    pub(crate) fn status(&self) -> TaskStatus {
        match self.state {
            RecordState::Queued => TaskStatus::Queued,
            RecordState::Running => TaskStatus::Running,
            RecordState::Complete => TaskStatus::AwaitingDelivery,
        }
    }
}
