//! Units of work executed on worker threads, and how they fail.

use std::any::Any;
use std::error::Error;
use std::fmt;

use eddy_core::FieldError;

/// A unit of work a [`WorkerPool`](crate::WorkerPool) runs off the
/// owning thread.
///
/// The job value is moved to a worker, run once, and handed back to the
/// owner with the completion, so any buffers it carries return with it.
pub trait Job: Send + 'static {
    /// Execute the work. Called exactly once, on a worker thread.
    fn run(&mut self) -> Result<(), JobError>;
}

/// A closure-backed [`Job`].
pub struct FnJob<F>(pub F);

impl<F> Job for FnJob<F>
where
    F: FnMut() -> Result<(), JobError> + Send + 'static,
{
    fn run(&mut self) -> Result<(), JobError> {
        (self.0)()
    }
}

impl<F> fmt::Debug for FnJob<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnJob(..)")
    }
}

/// A job that reported failure by returning an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobError {
    /// Description of what went wrong.
    pub reason: String,
}

impl JobError {
    /// Error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl Error for JobError {}

impl From<FieldError> for JobError {
    fn from(e: FieldError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<&str> for JobError {
    fn from(reason: &str) -> Self {
        Self::new(reason)
    }
}

impl From<String> for JobError {
    fn from(reason: String) -> Self {
        Self { reason }
    }
}

/// Why a task did not complete normally. Delivered alongside the job
/// instead of being rethrown on the worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskFault {
    /// The job returned an error.
    Failed(JobError),
    /// The job panicked; the worker caught the unwind and kept running.
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
    /// The pool was disposed before or while the task ran.
    Disposed,
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "job failed: {e}"),
            Self::Panicked { message } => write!(f, "job panicked: {message}"),
            Self::Disposed => write!(f, "worker pool disposed"),
        }
    }
}

impl Error for TaskFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
