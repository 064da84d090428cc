//! Grid flow fields for Eddy.
//!
//! A [`FlowField`] turns a solidity oracle and a goal cell into a
//! per-cell direction that leads toward the goal. Each calculation runs
//! three stages in order over buffers the field owns and reuses:
//!
//! 1. **Cost**: `0` at the goal, `1` for open cells, `255` for solid.
//! 2. **Integration**: cumulative cost from the goal, relaxed outward
//!    over the four cardinal neighbours by a FIFO wavefront. Cells the
//!    wavefront never reaches keep [`UNREACHED`].
//! 3. **Flow**: for each cell, the offset to the lowest-valued of its
//!    eight neighbours that improves on the cell's own value, with
//!    diagonal components trimmed where they would cut a solid corner.
//!
//! Fields hold no reference to the oracle after `calculate` returns and
//! can be moved freely between threads.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod field;
pub mod neighbours;

pub use field::{FlowField, BLOCKED_COST, DEFAULT_COST, GOAL_COST, UNREACHED};
