//! Canned and seeded tile maps.

use eddy_core::GridOracle;
use eddy_grid::{Tile, TileMap};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A fully walkable `width × height` map.
pub fn open_grid(width: u32, height: u32) -> TileMap {
    let mut map = TileMap::new(width, height).expect("valid fixture dims");
    for row in 0..height as i32 {
        for col in 0..width as i32 {
            map.set_tile(col, row, Tile::from_raw(Tile::WALKABLE_MASK));
        }
    }
    map
}

/// A 9×7 map: two open rooms joined by a one-cell-wide corridor along
/// row 3. Every corridor cell has solid cells directly above and below,
/// so any diagonal into or out of the corridor would cut a corner.
///
/// ```text
/// row 6  #########
/// row 5  #..###..#
/// row 4  #..###..#
/// row 3  #.......#
/// row 2  #..###..#
/// row 1  #..###..#
/// row 0  #########
/// ```
pub fn corridor_grid() -> TileMap {
    TileMap::from_text(
        "
        #########
        #..###..#
        #..###..#
        #.......#
        #..###..#
        #..###..#
        #########
        ",
    )
    .expect("valid corridor fixture")
}

/// A 7×5 switchback. The shortest route from `(0, 4)` to `(0, 0)` runs
/// the full length of each lane and costs 16.
///
/// ```text
/// row 4  .......
/// row 3  ######.
/// row 2  .......
/// row 1  .######
/// row 0  .......
/// ```
pub fn serpentine_grid() -> TileMap {
    TileMap::from_text(
        "
        .......
        ######.
        .......
        .######
        .......
        ",
    )
    .expect("valid serpentine fixture")
}

/// A `width × height` map where each cell is solid with probability
/// `density`, reproducible from `seed`.
pub fn random_grid(width: u32, height: u32, density: f64, seed: u64) -> TileMap {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut map = open_grid(width, height);
    for row in 0..height as i32 {
        for col in 0..width as i32 {
            if rng.random_bool(density) {
                map.set_tile(col, row, Tile::SOLID);
            }
        }
    }
    map
}

/// Count of open cells, for sanity checks on generated maps.
pub fn open_cells(map: &TileMap) -> usize {
    map.dims()
        .cells()
        .filter(|c| !map.is_solid(c.col, c.row))
        .count()
}
