//! Per-agent flow-field requests computed on the worker pool.
//!
//! [`FieldOrchestrator`] owns a [`WorkerPool`] and an [`ObjectPool`] of
//! [`FlowField`]s and lives on the owning thread:
//!
//! 1. [`request_field`](FieldOrchestrator::request_field) allocates a
//!    pooled field, detaches it into a [`FieldJob`] and submits it.
//! 2. A worker runs the three stages against the shared grid.
//! 3. [`drain_completed`](FieldOrchestrator::drain_completed), called
//!    once per frame, attaches each field back to the pool and either
//!    installs it as the agent's current field or releases it.
//!
//! An agent's current field is only ever replaced by a newer, fully
//! computed one. Failed and superseded results are released without
//! touching it.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use eddy_arena::{ObjectPool, PoolHandle};
use eddy_core::{AgentId, Cell, FieldError, FlowVector, GridDims, GridOracle};
use eddy_field::FlowField;
use indexmap::IndexMap;
use tracing::{debug, info, trace, warn};

use crate::config::{ConfigError, DuplicatePolicy, OrchestratorConfig, WorkerPoolConfig};
use crate::job::{Job, JobError, TaskFault};
use crate::metrics::OrchestratorMetrics;
use crate::task::TaskHandle;
use crate::wait::WaitContext;
use crate::worker_pool::{DeliveryError, ShutdownReport, SubmitError, WorkerPool};

// ── FieldJob ──────────────────────────────────────────────────────

/// One flow-field calculation, moved to a worker and back.
pub struct FieldJob<G: ?Sized> {
    agent: AgentId,
    goal: Cell,
    slot: PoolHandle,
    field: FlowField,
    grid: Arc<G>,
    dims: GridDims,
}

impl<G: ?Sized> FieldJob<G> {
    /// Agent the field is for.
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    /// Goal the field leads to.
    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// The field buffers.
    pub fn field(&self) -> &FlowField {
        &self.field
    }
}

impl<G: GridOracle + ?Sized + 'static> Job for FieldJob<G> {
    fn run(&mut self) -> Result<(), JobError> {
        self.field
            .try_calculate(&*self.grid, self.goal, self.dims)
            .map_err(JobError::from)
    }
}

impl<G: ?Sized> fmt::Debug for FieldJob<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldJob")
            .field("agent", &self.agent)
            .field("goal", &self.goal)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

// ── Requests and results ──────────────────────────────────────────

/// What [`FieldOrchestrator::request_field`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A calculation was queued.
    Submitted(TaskHandle),
    /// The agent already had a request outstanding and duplicates are
    /// ignored; carries that request's handle.
    AlreadyPending(TaskHandle),
}

/// A request was refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestError {
    /// The goal is outside the grid.
    Field(FieldError),
    /// The field pool is fixed-size and every field is in use.
    PoolExhausted,
    /// The worker pool has been shut down.
    Disposed,
    /// Draining results failed.
    Delivery(DeliveryError),
    /// The operation needs every request drained first.
    Busy {
        /// Requests still outstanding.
        in_flight: usize,
    },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(e) => write!(f, "{e}"),
            Self::PoolExhausted => write!(f, "flow-field pool exhausted"),
            Self::Disposed => write!(f, "worker pool has been disposed"),
            Self::Delivery(e) => write!(f, "delivery: {e}"),
            Self::Busy { in_flight } => {
                write!(f, "{in_flight} field requests still in flight")
            }
        }
    }
}

impl Error for RequestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            Self::Delivery(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FieldError> for RequestError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

impl From<DeliveryError> for RequestError {
    fn from(e: DeliveryError) -> Self {
        Self::Delivery(e)
    }
}

/// What happened to one drained result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The field is now the agent's current field.
    Installed,
    /// The calculation faulted; the agent keeps its previous field.
    Failed(TaskFault),
    /// A newer request superseded this one, or the agent was removed.
    Discarded,
}

/// One drained result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldUpdate {
    /// Agent the request was for.
    pub agent: AgentId,
    /// Goal of the request.
    pub goal: Cell,
    /// Handle the request was submitted under.
    pub task: TaskHandle,
    /// How it was applied.
    pub outcome: UpdateOutcome,
}

// ── FieldOrchestrator ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default)]
struct AgentSlot {
    current: Option<PoolHandle>,
    current_goal: Option<Cell>,
    pending: Option<TaskHandle>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Counters {
    requested: u64,
    coalesced: u64,
    exhausted: u64,
    installed: u64,
    failed: u64,
    discarded: u64,
}

/// Turns per-agent goal requests into flow fields computed off-thread.
///
/// Not thread-safe by intent: every method runs on the thread that owns
/// the orchestrator, which is also where results are installed.
pub struct FieldOrchestrator<G: GridOracle + ?Sized + 'static> {
    grid: Arc<G>,
    workers: WorkerPool<FieldJob<G>>,
    fields: ObjectPool<FlowField>,
    agents: IndexMap<AgentId, AgentSlot>,
    updates: Vec<FieldUpdate>,
    config: OrchestratorConfig,
    counters: Counters,
    in_flight: usize,
}

impl<G: GridOracle + ?Sized + 'static> FieldOrchestrator<G> {
    /// Build an orchestrator around an existing worker pool.
    pub fn new(
        grid: Arc<G>,
        workers: WorkerPool<FieldJob<G>>,
        config: OrchestratorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let dims = config.dims;
        let fields = ObjectPool::from_config(&config.pool, move || FlowField::new(dims))?;
        info!(
            width = dims.width(),
            height = dims.height(),
            fields = fields.capacity(),
            workers = workers.workers(),
            "field orchestrator ready"
        );
        Ok(Self {
            grid,
            workers,
            fields,
            agents: IndexMap::new(),
            updates: Vec::new(),
            config,
            counters: Counters::default(),
            in_flight: 0,
        })
    }

    /// Start a worker pool from `workers` and build an orchestrator on it.
    pub fn spawn(
        grid: Arc<G>,
        workers: WorkerPoolConfig,
        config: OrchestratorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let workers = WorkerPool::new(workers)?;
        Self::new(grid, workers, config)
    }

    /// Grid dimensions every field covers.
    pub fn dims(&self) -> GridDims {
        self.config.dims
    }

    /// The active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// The grid new requests are computed against.
    pub fn grid(&self) -> &Arc<G> {
        &self.grid
    }

    /// The underlying worker pool.
    pub fn workers(&self) -> &WorkerPool<FieldJob<G>> {
        &self.workers
    }

    /// Ask for a fresh field leading `agent` to `goal`.
    ///
    /// The agent's current field, if any, stays in place until the new
    /// one is drained.
    pub fn request_field(
        &mut self,
        agent: AgentId,
        goal: Cell,
    ) -> Result<RequestOutcome, RequestError> {
        self.submit(agent, goal, None)
    }

    /// Request a field and block until it has been computed and drained.
    ///
    /// Returns the agent's current field afterwards. If duplicates are
    /// ignored and a request was already outstanding, nothing new is
    /// waited on and the field may still be the old one.
    pub fn request_field_blocking(
        &mut self,
        agent: AgentId,
        goal: Cell,
    ) -> Result<Option<&FlowField>, RequestError> {
        let mut ctx = self.workers.wait_context();
        self.submit(agent, goal, Some(&mut ctx))?;
        ctx.wait();
        self.drain_completed()?;
        Ok(self.field(agent))
    }

    fn submit(
        &mut self,
        agent: AgentId,
        goal: Cell,
        wait: Option<&mut WaitContext>,
    ) -> Result<RequestOutcome, RequestError> {
        let dims = self.config.dims;
        if !dims.contains(goal) {
            return Err(FieldError::GoalOutOfBounds {
                goal,
                width: dims.width(),
                height: dims.height(),
            }
            .into());
        }

        let pending = self.agents.get(&agent).and_then(|slot| slot.pending);
        if let (Some(pending), DuplicatePolicy::Ignore) = (pending, self.config.duplicates) {
            self.counters.coalesced += 1;
            trace!(%agent, task = %pending, "request already pending");
            return Ok(RequestOutcome::AlreadyPending(pending));
        }

        let Some(handle) = self.fields.allocate() else {
            self.counters.exhausted += 1;
            warn!(%agent, capacity = self.fields.capacity(), "flow-field pool exhausted");
            return Err(RequestError::PoolExhausted);
        };
        let field = self.fields.detach(handle);
        let job = FieldJob {
            agent,
            goal,
            slot: handle,
            field,
            grid: Arc::clone(&self.grid),
            dims,
        };

        match self.workers.add_task(job, None, wait) {
            Ok(task) => {
                // Agents only enter the table once a request is accepted.
                self.agents.entry(agent).or_default().pending = Some(task);
                self.counters.requested += 1;
                self.in_flight += 1;
                debug!(%agent, %goal, %task, "field requested");
                Ok(RequestOutcome::Submitted(task))
            }
            Err(SubmitError::Disposed(job)) => {
                self.fields.attach(handle, job.field);
                self.fields.deallocate(handle);
                Err(RequestError::Disposed)
            }
        }
    }

    /// Deliver finished calculations and apply them.
    ///
    /// Call once per frame. For each result, in completion order:
    /// a successful result for the agent's latest request replaces its
    /// current field (the old one returns to the pool); a faulted result
    /// is released and the current field kept; a superseded result is
    /// released. Returns what happened to each, valid until the next
    /// drain.
    pub fn drain_completed(&mut self) -> Result<&[FieldUpdate], DeliveryError> {
        self.updates.clear();
        let Self {
            workers,
            fields,
            agents,
            updates,
            counters,
            in_flight,
            ..
        } = &mut *self;

        workers.deliver_complete_with(|task, job, fault| {
            let FieldJob {
                agent,
                goal,
                slot: handle,
                field,
                ..
            } = job;
            *in_flight = in_flight.saturating_sub(1);
            if let Err(e) = fields.try_attach(handle, field) {
                warn!(%agent, %task, error = %e, "returned field did not fit its slot");
                return;
            }

            let outcome = match agents.get_mut(&agent) {
                Some(slot) if slot.pending == Some(task) => {
                    slot.pending = None;
                    match fault {
                        None => {
                            if let Some(previous) = slot.current.replace(handle) {
                                release(fields, previous);
                            }
                            slot.current_goal = Some(goal);
                            counters.installed += 1;
                            trace!(%agent, %goal, %task, "field installed");
                            UpdateOutcome::Installed
                        }
                        Some(fault) => {
                            release(fields, handle);
                            counters.failed += 1;
                            warn!(%agent, %goal, %task, %fault, "field calculation failed");
                            UpdateOutcome::Failed(fault)
                        }
                    }
                }
                _ => {
                    release(fields, handle);
                    counters.discarded += 1;
                    trace!(%agent, %task, "stale field discarded");
                    UpdateOutcome::Discarded
                }
            };
            updates.push(FieldUpdate {
                agent,
                goal,
                task,
                outcome,
            });
        })?;
        Ok(&self.updates)
    }

    /// The agent's current field.
    pub fn field(&self, agent: AgentId) -> Option<&FlowField> {
        let handle = self.agents.get(&agent)?.current?;
        self.fields.get(handle)
    }

    /// Goal of the agent's current field.
    pub fn current_goal(&self, agent: AgentId) -> Option<Cell> {
        self.agents.get(&agent)?.current_goal
    }

    /// Whether the agent has a request outstanding.
    pub fn is_pending(&self, agent: AgentId) -> bool {
        self.agents
            .get(&agent)
            .is_some_and(|slot| slot.pending.is_some())
    }

    /// Direction from `cell` in the agent's current field; zero if the
    /// agent has none.
    pub fn flow_at(&self, agent: AgentId, cell: Cell) -> FlowVector {
        self.field(agent)
            .map_or(FlowVector::ZERO, |field| field.flow_at(cell))
    }

    /// Direction at a world position, using the configured tile size.
    pub fn flow_at_world(&self, agent: AgentId, x: f32, y: f32) -> FlowVector {
        self.field(agent).map_or(FlowVector::ZERO, |field| {
            field.flow_at_world(x, y, self.config.tile_size)
        })
    }

    /// Agents known to the orchestrator, in first-request order.
    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.keys().copied()
    }

    /// Forget an agent and release its current field. An outstanding
    /// request is discarded when it drains. Returns whether the agent
    /// was known.
    pub fn remove_agent(&mut self, agent: AgentId) -> bool {
        let Some(slot) = self.agents.shift_remove(&agent) else {
            return false;
        };
        if let Some(handle) = slot.current {
            release(&mut self.fields, handle);
        }
        debug!(%agent, "agent removed");
        true
    }

    /// Requests submitted and not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Swap the grid used by future requests.
    ///
    /// Refused while requests are in flight, since they read the old
    /// grid. Installed fields are kept; call [`reset`](Self::reset) to
    /// drop them.
    pub fn replace_grid(&mut self, grid: Arc<G>) -> Result<(), RequestError> {
        if self.in_flight > 0 {
            return Err(RequestError::Busy {
                in_flight: self.in_flight,
            });
        }
        self.grid = grid;
        info!("grid replaced");
        Ok(())
    }

    /// Forget every agent and return all fields to the pool in one pass.
    /// Refused while requests are in flight. Returns the number of fields
    /// released.
    pub fn reset(&mut self) -> Result<usize, RequestError> {
        if self.in_flight > 0 {
            return Err(RequestError::Busy {
                in_flight: self.in_flight,
            });
        }
        self.agents.clear();
        let released = self.fields.deallocate_all();
        info!(released, "field orchestrator reset");
        Ok(released)
    }

    /// Snapshot of request counters and pool occupancy.
    pub fn metrics(&self) -> OrchestratorMetrics {
        let c = &self.counters;
        OrchestratorMetrics {
            requested: c.requested,
            coalesced: c.coalesced,
            exhausted: c.exhausted,
            installed: c.installed,
            failed: c.failed,
            discarded: c.discarded,
            in_flight: self.in_flight,
            agents_with_field: self
                .agents
                .values()
                .filter(|slot| slot.current.is_some())
                .count(),
            pool_capacity: self.fields.capacity(),
            pool_available: self.fields.available(),
        }
    }

    /// Shut the worker pool down and drain everything it parked, so every
    /// in-flight field returns to the pool.
    pub fn shutdown(&mut self) -> Result<ShutdownReport, DeliveryError> {
        let mut report = self.workers.shutdown();
        report.delivered = self.drain_completed()?.len();
        info!(delivered = report.delivered, "field orchestrator shut down");
        Ok(report)
    }
}

fn release(fields: &mut ObjectPool<FlowField>, handle: PoolHandle) {
    if let Err(e) = fields.try_deallocate(handle) {
        warn!(%handle, error = %e, "field release failed");
    }
}

impl<G: GridOracle + ?Sized + 'static> fmt::Debug for FieldOrchestrator<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOrchestrator")
            .field("dims", &self.config.dims)
            .field("agents", &self.agents.len())
            .field("in_flight", &self.in_flight)
            .field("fields", &self.fields)
            .field("workers", &self.workers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_arena::{Growth, PoolConfig};
    use eddy_grid::TileMap;
    use eddy_test_utils::{open_grid, FaultingOracle};
    use std::time::{Duration, Instant};

    fn orchestrator<G: GridOracle + 'static>(
        grid: G,
        tweak: impl FnOnce(&mut OrchestratorConfig),
    ) -> FieldOrchestrator<G> {
        let mut config = OrchestratorConfig::new(GridDims::new(8, 8).unwrap());
        tweak(&mut config);
        FieldOrchestrator::spawn(Arc::new(grid), WorkerPoolConfig::with_workers(2), config)
            .unwrap()
    }

    fn open() -> TileMap {
        open_grid(8, 8)
    }

    fn drain_all<G: GridOracle + 'static>(o: &mut FieldOrchestrator<G>) -> Vec<FieldUpdate> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut all = Vec::new();
        while o.in_flight() > 0 && Instant::now() < deadline {
            all.extend_from_slice(o.drain_completed().unwrap());
            std::thread::yield_now();
        }
        all
    }

    #[test]
    fn blocking_request_installs_field() {
        let mut o = orchestrator(open(), |_| {});
        let agent = AgentId(1);
        let field = o
            .request_field_blocking(agent, Cell::new(4, 4))
            .unwrap()
            .expect("installed");
        assert_eq!(field.goal(), Some(Cell::new(4, 4)));
        assert_eq!(field.integration_at(Cell::new(0, 4)), 4);
        assert_eq!(o.current_goal(agent), Some(Cell::new(4, 4)));
        assert_eq!(o.flow_at(agent, Cell::new(0, 4)), FlowVector { x: 1, y: 0 });
        assert!(!o.is_pending(agent));
        assert_eq!(o.in_flight(), 0);
    }

    #[test]
    fn out_of_bounds_goal_rejected_before_submit() {
        let mut o = orchestrator(open(), |_| {});
        let err = o.request_field(AgentId(1), Cell::new(8, 0)).unwrap_err();
        assert!(matches!(
            err,
            RequestError::Field(FieldError::GoalOutOfBounds { .. })
        ));
        assert_eq!(o.metrics().requested, 0);
        assert_eq!(o.in_flight(), 0);
    }

    #[test]
    fn duplicate_requests_ignored_by_default() {
        let mut o = orchestrator(open(), |_| {});
        let agent = AgentId(3);
        let first = o.request_field(agent, Cell::new(1, 1)).unwrap();
        let RequestOutcome::Submitted(task) = first else {
            panic!("expected submission, got {first:?}");
        };
        // Still pending until drained, whatever the workers have done.
        let second = o.request_field(agent, Cell::new(6, 6)).unwrap();
        assert_eq!(second, RequestOutcome::AlreadyPending(task));

        let updates = drain_all(&mut o);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].outcome, UpdateOutcome::Installed);
        assert_eq!(o.current_goal(agent), Some(Cell::new(1, 1)));
        assert_eq!(o.metrics().coalesced, 1);
    }

    #[test]
    fn supersede_keeps_only_latest() {
        let mut o = orchestrator(open(), |c| c.duplicates = DuplicatePolicy::Supersede);
        let agent = AgentId(4);
        o.request_field(agent, Cell::new(1, 1)).unwrap();
        o.request_field(agent, Cell::new(2, 2)).unwrap();
        o.request_field(agent, Cell::new(6, 6)).unwrap();

        let updates = drain_all(&mut o);
        assert_eq!(updates.len(), 3);
        let installed: Vec<_> = updates
            .iter()
            .filter(|u| u.outcome == UpdateOutcome::Installed)
            .collect();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].goal, Cell::new(6, 6));
        assert_eq!(o.current_goal(agent), Some(Cell::new(6, 6)));
        // One field installed, the other two back in the pool.
        let m = o.metrics();
        assert_eq!(m.discarded, 2);
        assert_eq!(m.pool_capacity - m.pool_available, 1);
    }

    #[test]
    fn failed_request_keeps_previous_field() {
        let grid = FaultingOracle::new(open(), Cell::new(7, 7));
        grid.set_armed(false);
        let mut o = orchestrator(grid, |_| {});
        let agent = AgentId(5);
        o.request_field_blocking(agent, Cell::new(0, 0)).unwrap();
        assert_eq!(o.current_goal(agent), Some(Cell::new(0, 0)));

        o.grid().set_armed(true);
        // Every calculation reads every cell, so this one panics on the
        // poisoned cell.
        let _ = o.request_field(agent, Cell::new(3, 3)).unwrap();
        let updates = drain_all(&mut o);
        assert_eq!(updates.len(), 1);
        assert!(matches!(
            updates[0].outcome,
            UpdateOutcome::Failed(TaskFault::Panicked { .. })
        ));
        assert_eq!(o.current_goal(agent), Some(Cell::new(0, 0)));
        assert!(o.field(agent).is_some());
        assert_eq!(o.metrics().failed, 1);
    }

    #[test]
    fn fixed_pool_exhaustion_is_reported() {
        let mut o = orchestrator(open(), |c| {
            c.pool = PoolConfig {
                initial: 1,
                growth: Growth::Fixed,
            }
        });
        o.request_field(AgentId(1), Cell::new(0, 0)).unwrap();
        let err = o.request_field(AgentId(2), Cell::new(0, 0)).unwrap_err();
        assert_eq!(err, RequestError::PoolExhausted);
        assert_eq!(o.metrics().exhausted, 1);
        assert_eq!(o.agents().collect::<Vec<_>>(), vec![AgentId(1)]);
        assert!(!o.is_pending(AgentId(2)));
        for id in 10..40 {
            assert!(o.request_field(AgentId(id), Cell::new(0, 0)).is_err());
        }
        assert_eq!(o.agents().count(), 1);

        drain_all(&mut o);
        // The installed field holds the only instance.
        assert!(o.remove_agent(AgentId(1)));
        assert!(o.request_field(AgentId(2), Cell::new(0, 0)).is_ok());
        drain_all(&mut o);
    }

    #[test]
    fn removed_agent_result_is_discarded() {
        let mut o = orchestrator(open(), |_| {});
        o.request_field(AgentId(9), Cell::new(2, 2)).unwrap();
        assert!(o.remove_agent(AgentId(9)));
        assert!(!o.remove_agent(AgentId(9)));
        let updates = drain_all(&mut o);
        assert_eq!(updates[0].outcome, UpdateOutcome::Discarded);
        assert!(o.field(AgentId(9)).is_none());
        let m = o.metrics();
        assert_eq!(m.pool_capacity, m.pool_available);
    }

    #[test]
    fn reset_and_replace_grid_refused_while_in_flight() {
        let mut o = orchestrator(open(), |_| {});
        o.request_field(AgentId(1), Cell::new(0, 0)).unwrap();
        assert_eq!(o.reset(), Err(RequestError::Busy { in_flight: 1 }));
        assert!(o.replace_grid(Arc::new(open())).is_err());

        drain_all(&mut o);
        o.request_field_blocking(AgentId(2), Cell::new(1, 0)).unwrap();
        assert!(o.replace_grid(Arc::new(open())).is_ok());
        assert_eq!(o.reset(), Ok(2));
        assert!(o.field(AgentId(1)).is_none());
        assert_eq!(o.agents().count(), 0);
    }

    #[test]
    fn shutdown_returns_fields_and_refuses_new_work() {
        let mut o = orchestrator(open(), |_| {});
        for i in 0..6 {
            o.request_field(AgentId(i), Cell::new(3, 3)).unwrap();
        }
        let report = o.shutdown().unwrap();
        assert_eq!(report.workers_joined, 2);
        assert_eq!(report.delivered, 6);
        assert_eq!(o.in_flight(), 0);

        let err = o.request_field(AgentId(7), Cell::new(3, 3)).unwrap_err();
        assert_eq!(err, RequestError::Disposed);
        assert!(!o.agents().any(|a| a == AgentId(7)));
        let m = o.metrics();
        // Only successful, non-disposed results hold a field.
        assert_eq!(m.pool_capacity - m.pool_available, m.agents_with_field);
    }

    #[test]
    fn world_lookup_uses_tile_size() {
        let mut o = orchestrator(open(), |c| c.tile_size = 10.0);
        let agent = AgentId(1);
        o.request_field_blocking(agent, Cell::new(7, 0)).unwrap();
        // (35.0, 5.0) is cell (3, 0).
        assert_eq!(o.flow_at_world(agent, 35.0, 5.0), FlowVector { x: 1, y: 0 });
        assert_eq!(o.flow_at_world(AgentId(2), 35.0, 5.0), FlowVector::ZERO);
    }
}
