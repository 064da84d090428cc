//! Point-in-time counters for the worker pool and orchestrator.
//!
//! Counters are cumulative since construction; depths and occupancy are
//! sampled when the snapshot is taken.

/// Snapshot of a [`WorkerPool`](crate::WorkerPool).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Worker threads started.
    pub workers: usize,
    /// Tasks accepted by `add_task`.
    pub submitted: u64,
    /// Tasks whose job ran to completion without a fault.
    pub completed: u64,
    /// Tasks whose job returned an error or panicked.
    pub faulted: u64,
    /// Tasks failed because the pool was disposed.
    pub disposed: u64,
    /// Completions handed to a callback or visitor.
    pub delivered: u64,
    /// Tasks waiting for a worker.
    pub queued: usize,
    /// Tasks being executed right now.
    pub running: usize,
    /// Tasks finished and waiting for the owner to drain.
    pub awaiting_delivery: usize,
}

/// Snapshot of a [`FieldOrchestrator`](crate::FieldOrchestrator).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrchestratorMetrics {
    /// Requests submitted to the worker pool.
    pub requested: u64,
    /// Requests ignored because the agent already had one outstanding.
    pub coalesced: u64,
    /// Requests refused because the field pool was exhausted.
    pub exhausted: u64,
    /// Results installed as an agent's current field.
    pub installed: u64,
    /// Results that faulted; the agent kept its previous field.
    pub failed: u64,
    /// Results dropped because a newer request superseded them or the
    /// agent was removed.
    pub discarded: u64,
    /// Requests submitted and not yet drained.
    pub in_flight: usize,
    /// Agents with an installed field.
    pub agents_with_field: usize,
    /// Field instances the pool has created.
    pub pool_capacity: usize,
    /// Field instances ready for allocation.
    pub pool_available: usize,
}
