//! Strongly-typed identifiers and the [`Cell`] coordinate.

use std::fmt;

/// Identifies a consumer of flow fields, typically one agent.
///
/// The orchestrator keeps at most one installed field per `AgentId`.
/// IDs are opaque to the workspace; the owning system chooses them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AgentId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A grid coordinate as a `(col, row)` pair.
///
/// Columns grow to the right and rows grow upward, so `(0, 0)` is the
/// bottom-left tile. Components are signed: neighbour arithmetic can
/// step outside the grid, and out-of-range cells are always treated
/// as solid rather than wrapped or clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Column index, 0-based from the left edge.
    pub col: i32,
    /// Row index, 0-based from the bottom edge.
    pub row: i32,
}

impl Cell {
    /// Construct a cell from its column and row.
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The cell displaced by `(dc, dr)`.
    #[inline]
    pub const fn offset(self, dc: i32, dr: i32) -> Self {
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }

    /// The tile containing world position `(x, y)` for square tiles of
    /// side `tile_size` world units, with the origin at the bottom-left
    /// corner of cell `(0, 0)`.
    pub fn from_world(x: f32, y: f32, tile_size: f32) -> Self {
        Self {
            col: (x / tile_size).floor() as i32,
            row: (y / tile_size).floor() as i32,
        }
    }

    /// Chebyshev (king-move) distance to `other`.
    pub fn chebyshev(self, other: Cell) -> u32 {
        let dc = (self.col - other.col).unsigned_abs();
        let dr = (self.row - other.row).unsigned_abs();
        dc.max(dr)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((col, row): (i32, i32)) -> Self {
        Self { col, row }
    }
}
