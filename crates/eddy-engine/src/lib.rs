//! Off-thread flow-field computation for Eddy.
//!
//! Two layers sit on top of the algorithm crates:
//!
//! ```text
//! FieldOrchestrator<G>          owning thread: per-agent requests and results
//! ├── ObjectPool<FlowField>     reusable field buffers
//! └── WorkerPool<FieldJob<G>>   fixed set of OS threads
//!     ├── shared work queue     Mutex + Condvar, records in a Slab
//!     ├── completed list        drained only through &mut WorkerPool
//!     └── WaitRegistry          pooled one-shot wake-ups
//! ```
//!
//! # Delivery invariant
//!
//! Worker threads never run completion code. A finished task is parked
//! on the completed list until its owner calls
//! [`WorkerPool::deliver_complete`] (or [`WorkerPool::update`]). Both
//! take `&mut self`, and worker threads only hold the shared queue, so
//! completion callbacks always run on the thread that owns the pool and
//! can touch single-threaded state freely.
//!
//! # Faults
//!
//! A job that returns an error or panics is captured as a [`TaskFault`]
//! and delivered like any other completion; the worker thread keeps
//! running. A completion callback that panics during a drain stops the
//! drain, requeues the undelivered completions for the next one and
//! surfaces as [`DeliveryError::CallbackPanicked`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod job;
pub mod metrics;
pub mod orchestrator;
mod queue;
pub mod task;
pub mod wait;
mod worker;
pub mod worker_pool;

pub use config::{ConfigError, DuplicatePolicy, OrchestratorConfig, WorkerPoolConfig};
pub use job::{FnJob, Job, JobError, TaskFault};
pub use metrics::{OrchestratorMetrics, PoolMetrics};
pub use orchestrator::{
    FieldJob, FieldOrchestrator, FieldUpdate, RequestError, RequestOutcome, UpdateOutcome,
};
pub use task::{Completion, TaskHandle, TaskStatus};
pub use wait::WaitContext;
pub use worker_pool::{DeliveryError, ShutdownReport, SubmitError, WorkerPool};
