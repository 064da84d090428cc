//! Eddy: multithreaded grid flow-field pathfinding.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Eddy sub-crates. For most users, adding `eddy` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use eddy::prelude::*;
//! use std::sync::Arc;
//!
//! let map = TileMap::from_text(
//!     "
//!     ......
//!     .####.
//!     ......
//!     ",
//! )
//! .unwrap();
//! let dims = map.dims();
//! let mut orchestrator = FieldOrchestrator::spawn(
//!     Arc::new(map),
//!     WorkerPoolConfig::with_workers(2),
//!     OrchestratorConfig::new(dims),
//! )
//! .unwrap();
//!
//! // Ask for a field toward the bottom-left corner and wait for it.
//! let field = orchestrator
//!     .request_field_blocking(AgentId(1), Cell::new(0, 0))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(field.integration_at(Cell::new(5, 0)), 5);
//!
//! // Agents steer by sampling their field each frame.
//! assert_eq!(orchestrator.flow_at(AgentId(1), Cell::new(5, 0)), FlowVector { x: -1, y: 0 });
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `eddy-core` | Cells, agent ids, flow vectors, grid dimensions, `GridOracle` |
//! | [`arena`] | `eddy-arena` | Generational `Slab` and `ObjectPool` |
//! | [`grid`] | `eddy-grid` | Layered `TileMap` and its text format |
//! | [`field`] | `eddy-field` | `FlowField` and its cost constants |
//! | [`engine`] | `eddy-engine` | `WorkerPool` and `FieldOrchestrator` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`eddy-core`).
///
/// Contains [`types::Cell`], [`types::FlowVector`], [`types::GridDims`]
/// and the [`types::GridOracle`] trait every walkability source implements.
pub use eddy_core as types;

/// Slabs and object pools (`eddy-arena`).
pub use eddy_arena as arena;

/// Tile maps (`eddy-grid`).
///
/// [`grid::TileMap`] is the stock [`types::GridOracle`]: packed tiles with
/// a layer nibble and a walkability mask, parseable from text.
pub use eddy_grid as grid;

/// The flow-field algorithm (`eddy-field`).
pub use eddy_field as field;

/// Off-thread computation (`eddy-engine`).
///
/// [`engine::WorkerPool`] runs arbitrary [`engine::Job`]s and delivers
/// completions on the owning thread; [`engine::FieldOrchestrator`] layers
/// per-agent field requests on top.
pub use eddy_engine as engine;

/// Common imports for typical Eddy usage.
///
/// ```rust
/// use eddy::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use eddy_core::{AgentId, Cell, FlowVector, GridDims, GridOracle};

    // Errors
    pub use eddy_core::{FieldError, GridError};

    // Grid
    pub use eddy_grid::{Tile, TileMap};

    // Field
    pub use eddy_field::{FlowField, UNREACHED};

    // Engine
    pub use eddy_engine::{
        ConfigError, DeliveryError, DuplicatePolicy, FieldOrchestrator, FieldUpdate, Job,
        JobError, OrchestratorConfig, RequestError, RequestOutcome, TaskFault, TaskHandle,
        UpdateOutcome, WorkerPool, WorkerPoolConfig,
    };
}
