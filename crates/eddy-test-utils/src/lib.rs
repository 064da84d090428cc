//! Test fixtures and reference solvers for Eddy development.
//!
//! Provides canned and seeded-random [`TileMap`](eddy_grid::TileMap)s,
//! a brute-force Dijkstra to check integration fields against, a greedy
//! walker that follows any flow lookup, and oracle wrappers that count
//! or fault on queries.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod oracles;
pub mod reference;

pub use fixtures::{corridor_grid, open_grid, random_grid, serpentine_grid};
pub use oracles::{CountingOracle, FaultingOracle, SlowOracle};
pub use reference::{follow_flow, reference_integration, Walk};
