//! Benchmark profiles for the Eddy flow-field pathfinder.
//!
//! - [`reference_map`]: 128x128 map (16K cells) with scattered walls
//! - [`stress_map`]: 255x255 map (~65K cells), the largest grid a field
//!   supports
//! - [`agent_goals`]: deterministic open goal cells per agent

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use eddy_core::{AgentId, Cell, GridOracle};
use eddy_grid::{Tile, TileMap};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Fraction of cells made solid in the benchmark maps.
pub const WALL_DENSITY: f64 = 0.2;

/// Build a reference benchmark map: 128x128 (16K cells).
pub fn reference_map(seed: u64) -> TileMap {
    walled_map(128, 128, seed)
}

/// Build a stress benchmark map: 255x255 (~65K cells).
pub fn stress_map(seed: u64) -> TileMap {
    walled_map(255, 255, seed)
}

fn walled_map(width: u32, height: u32, seed: u64) -> TileMap {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    // Valid by construction: both maps are within the cell limit.
    let mut map = match TileMap::new(width, height) {
        Ok(map) => map,
        Err(e) => panic!("benchmark map {width}x{height}: {e}"),
    };
    for row in 0..height as i32 {
        for col in 0..width as i32 {
            let tile = if rng.random_bool(WALL_DENSITY) {
                Tile::SOLID
            } else {
                Tile::from_raw(Tile::WALKABLE_MASK)
            };
            map.set_tile(col, row, tile);
        }
    }
    map
}

/// Pick a walkable goal cell for each of `n` agents, reproducible from
/// `seed`. Goals may repeat.
pub fn agent_goals<G: GridOracle>(grid: &G, width: u32, height: u32, n: u64, seed: u64) -> Vec<(AgentId, Cell)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut goals = Vec::with_capacity(n as usize);
    for i in 0..n {
        let goal = loop {
            let cell = Cell::new(
                rng.random_range(0..width as i32),
                rng.random_range(0..height as i32),
            );
            if !grid.is_cell_solid(cell) {
                break cell;
            }
        };
        goals.push((AgentId(i), goal));
    }
    goals
}
