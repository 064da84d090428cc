//! Grid dimensions and the [`GridOracle`] solidity contract.

use std::sync::Arc;

use crate::error::GridError;
use crate::id::Cell;

/// Largest cell count a grid may have.
///
/// Integration values are `u16` and `u16::MAX` marks "unreached". With
/// a traversal cost of 1 per step the longest cardinal path visits every
/// cell once, so its cost is `cells - 1`. Capping the grid at 65535
/// cells keeps every real path cost strictly below the sentinel.
pub const MAX_CELLS: usize = u16::MAX as usize;

/// Width and height of a rectangular grid, fixed at construction.
///
/// Cells are stored row-major: `index = row * width + col`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDims {
    width: u32,
    height: u32,
}

impl GridDims {
    /// Create dimensions for a `width × height` grid.
    ///
    /// Returns [`GridError::EmptyGrid`] if either side is zero and
    /// [`GridError::TooManyCells`] if the area exceeds [`MAX_CELLS`].
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid { width, height });
        }
        let cells = width as usize * height as usize;
        if cells > MAX_CELLS {
            return Err(GridError::TooManyCells {
                cells,
                max: MAX_CELLS,
            });
        }
        Ok(Self { width, height })
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether `cell` lies inside the grid.
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as u32) < self.width
            && (cell.row as u32) < self.height
    }

    /// Flat row-major index of `cell`, or `None` if out of range.
    #[inline]
    pub fn index(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.row as usize * self.width as usize + cell.col as usize)
        } else {
            None
        }
    }

    /// Inverse of [`index`](Self::index).
    ///
    /// # Panics
    ///
    /// Panics if `index >= cell_count()`.
    pub fn cell_at(&self, index: usize) -> Cell {
        assert!(
            index < self.cell_count(),
            "cell index {index} out of range for {}x{} grid",
            self.width,
            self.height
        );
        let w = self.width as usize;
        Cell::new((index % w) as i32, (index / w) as i32)
    }

    /// Iterate every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.cell_count()).map(move |i| self.cell_at(i))
    }
}

/// Read-only answer to "is this cell solid?".
///
/// Implementations are shared by every in-flight flow-field computation
/// and called concurrently from worker threads, so they must be free of
/// side effects. Coordinates outside the grid must report `true`.
pub trait GridOracle: Send + Sync {
    /// Whether the cell at `(col, row)` blocks movement.
    fn is_solid(&self, col: i32, row: i32) -> bool;

    /// Convenience wrapper taking a [`Cell`].
    fn is_cell_solid(&self, cell: Cell) -> bool {
        self.is_solid(cell.col, cell.row)
    }
}

impl<G: GridOracle + ?Sized> GridOracle for &G {
    fn is_solid(&self, col: i32, row: i32) -> bool {
        (**self).is_solid(col, row)
    }
}

impl<G: GridOracle + ?Sized> GridOracle for Arc<G> {
    fn is_solid(&self, col: i32, row: i32) -> bool {
        (**self).is_solid(col, row)
    }
}

impl<G: GridOracle + ?Sized> GridOracle for Box<G> {
    fn is_solid(&self, col: i32, row: i32) -> bool {
        (**self).is_solid(col, row)
    }
}

// Compile-time assertion: a shared oracle handle crosses threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Arc<dyn GridOracle>>();
};
