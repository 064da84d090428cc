//! Worker pool and orchestrator configuration.

use std::error::Error;
use std::fmt;

use eddy_arena::{PoolConfig, PoolError};
use eddy_core::{GridDims, GridError};

// ── WorkerPoolConfig ──────────────────────────────────────────────

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
#[derive(Clone, Debug)]
pub struct WorkerPoolConfig {
    /// Number of worker threads. `None` = one per available core.
    pub worker_count: Option<usize>,
    /// Worker threads are named `{prefix}-{index}`. Default: `"eddy-worker"`.
    pub thread_name_prefix: String,
    /// Task records reserved up front so steady-state submission does
    /// not allocate. Default: 256.
    pub initial_task_capacity: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            thread_name_prefix: "eddy-worker".to_string(),
            initial_task_capacity: 256,
        }
    }
}

impl WorkerPoolConfig {
    /// Config with an explicit worker count and defaults elsewhere.
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count: Some(worker_count),
            ..Self::default()
        }
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`. A pool with no workers
    /// would accept tasks that never run.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .clamp(1, 64),
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_name_prefix.is_empty() || self.thread_name_prefix.contains('\0') {
            return Err(ConfigError::InvalidThreadName {
                prefix: self.thread_name_prefix.clone(),
            });
        }
        Ok(())
    }
}

// ── OrchestratorConfig ────────────────────────────────────────────

/// What to do when an agent asks for a field while its previous request
/// is still being computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the outstanding request; the new one is reported as
    /// already pending and nothing is submitted.
    #[default]
    Ignore,
    /// Submit the new request. Whichever older request finishes later
    /// is discarded when drained.
    Supersede,
}

/// Configuration for a [`FieldOrchestrator`](crate::FieldOrchestrator).
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Dimensions every pooled field is allocated for.
    pub dims: GridDims,
    /// Sizing of the flow-field pool. Default: 64 instances, growable.
    pub pool: PoolConfig,
    /// Handling of repeated requests for the same agent.
    pub duplicates: DuplicatePolicy,
    /// World units per tile, used by world-coordinate lookups. Default: 16.
    pub tile_size: f32,
}

impl OrchestratorConfig {
    /// Default world units per tile.
    pub const DEFAULT_TILE_SIZE: f32 = 16.0;

    /// Config for `dims` with defaults elsewhere.
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            pool: PoolConfig::default(),
            duplicates: DuplicatePolicy::default(),
            tile_size: Self::DEFAULT_TILE_SIZE,
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()?;
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize {
                value: self.tile_size,
            });
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating configuration or starting threads.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Grid dimensions are unusable.
    Grid(GridError),
    /// Flow-field pool configuration is invalid.
    Pool(PoolError),
    /// tile_size is NaN, infinite, zero, or negative.
    InvalidTileSize {
        /// The invalid value.
        value: f32,
    },
    /// Thread name prefix is empty or contains a NUL byte.
    InvalidThreadName {
        /// The rejected prefix.
        prefix: String,
    },
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Pool(e) => write!(f, "field pool: {e}"),
            Self::InvalidTileSize { value } => {
                write!(f, "tile_size must be finite and positive, got {value}")
            }
            Self::InvalidThreadName { prefix } => {
                write!(f, "invalid thread name prefix {prefix:?}")
            }
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Pool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<PoolError> for ConfigError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}
