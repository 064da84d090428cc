//! Neighbour offset tables and bounds-checked neighbour lookup.
//!
//! Enumeration order is part of the flow stage's tie-break: among
//! neighbours with equal lowest integration, the first in this order
//! wins. Cardinals come first as up, right, down, left, followed by the
//! diagonals.

use eddy_core::{Cell, GridDims};
use smallvec::SmallVec;

/// Up, right, down, left.
pub const CARDINAL: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Cardinals in [`CARDINAL`] order, then the four diagonals.
pub const ALL: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Flat indices of the in-bounds neighbours of `cell` under `offsets`,
/// in table order. Out-of-range neighbours are skipped.
pub(crate) fn neighbours_flat<const N: usize>(
    cell: Cell,
    dims: GridDims,
    offsets: &[(i32, i32); N],
) -> SmallVec<[(usize, usize); 8]> {
    let mut result = SmallVec::new();
    for (k, &(dc, dr)) in offsets.iter().enumerate() {
        if let Some(i) = dims.index(cell.offset(dc, dr)) {
            result.push((k, i));
        }
    }
    result
}
