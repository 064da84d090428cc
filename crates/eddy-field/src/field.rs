//! The three-stage flow-field calculation.

use std::collections::VecDeque;
use std::fmt;

use eddy_core::{Cell, FieldError, FlowVector, GridDims, GridOracle};

use crate::neighbours::{neighbours_flat, ALL, CARDINAL};

/// Cost of the goal cell.
pub const GOAL_COST: u8 = 0;
/// Cost of an open cell.
pub const DEFAULT_COST: u8 = 1;
/// Cost of a solid cell. Never entered by the wavefront.
pub const BLOCKED_COST: u8 = 255;
/// Integration value of a cell the wavefront never reached.
pub const UNREACHED: u16 = u16::MAX;

/// Cost, integration and flow buffers for one grid.
///
/// Buffers are sized once at construction and overwritten by every
/// [`calculate`](Self::calculate). Nothing carries over between calls
/// except the allocations themselves, so a field taken from a pool
/// needs no reset before reuse.
#[derive(Clone)]
pub struct FlowField {
    dims: GridDims,
    costs: Vec<u8>,
    integration: Vec<u16>,
    flow: Vec<FlowVector>,
    goal: Option<Cell>,
    /// Wavefront queue, kept to avoid reallocating per call.
    open: VecDeque<usize>,
    /// Whether each cell is currently in `open`.
    queued: Vec<bool>,
}

impl FlowField {
    /// Allocate buffers for a grid of `dims`.
    ///
    /// The field starts uncalculated: every cost is blocked, every
    /// integration value unreached and every vector zero.
    pub fn new(dims: GridDims) -> Self {
        let n = dims.cell_count();
        Self {
            dims,
            costs: vec![BLOCKED_COST; n],
            integration: vec![UNREACHED; n],
            flow: vec![FlowVector::ZERO; n],
            goal: None,
            open: VecDeque::with_capacity(n),
            queued: vec![false; n],
        }
    }

    /// Grid dimensions the buffers hold.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Goal of the last calculation, or `None` if never calculated.
    pub fn goal(&self) -> Option<Cell> {
        self.goal
    }

    /// Check the calculation contract without running it.
    pub fn check(&self, goal: Cell, dims: GridDims) -> Result<(), FieldError> {
        if dims != self.dims {
            return Err(FieldError::DimensionMismatch {
                allocated: (self.dims.width(), self.dims.height()),
                requested: (dims.width(), dims.height()),
            });
        }
        if !dims.contains(goal) {
            return Err(FieldError::GoalOutOfBounds {
                goal,
                width: dims.width(),
                height: dims.height(),
            });
        }
        Ok(())
    }

    /// Run all three stages toward `goal` over `grid`.
    ///
    /// # Panics
    ///
    /// Panics if `goal` is outside `dims` or `dims` differs from the
    /// dimensions this field was allocated for. Both are caller bugs;
    /// use [`try_calculate`](Self::try_calculate) to get an error
    /// instead.
    pub fn calculate<G>(&mut self, grid: &G, goal: Cell, dims: GridDims)
    where
        G: GridOracle + ?Sized,
    {
        if let Err(e) = self.check(goal, dims) {
            panic!("FlowField::calculate: {e}");
        }
        self.run(grid, goal);
    }

    /// [`calculate`](Self::calculate), reporting contract violations as
    /// errors. The buffers are untouched on error.
    pub fn try_calculate<G>(&mut self, grid: &G, goal: Cell, dims: GridDims) -> Result<(), FieldError>
    where
        G: GridOracle + ?Sized,
    {
        self.check(goal, dims)?;
        self.run(grid, goal);
        Ok(())
    }

    fn run<G: GridOracle + ?Sized>(&mut self, grid: &G, goal: Cell) {
        // Checked by the callers.
        let goal_index = match self.dims.index(goal) {
            Some(i) => i,
            None => return,
        };
        self.goal = Some(goal);
        self.build_costs(grid, goal_index);
        self.integrate(goal_index);
        self.build_flow();
        self.trim_corner_cuts();
    }

    // ── Stage 1: cost ──────────────────────────────────────────────

    fn build_costs<G: GridOracle + ?Sized>(&mut self, grid: &G, goal_index: usize) {
        let w = self.dims.width() as usize;
        for (i, cost) in self.costs.iter_mut().enumerate() {
            let (col, row) = ((i % w) as i32, (i / w) as i32);
            *cost = if grid.is_solid(col, row) {
                BLOCKED_COST
            } else {
                DEFAULT_COST
            };
        }
        self.costs[goal_index] = GOAL_COST;
    }

    // ── Stage 2: integration ───────────────────────────────────────

    fn integrate(&mut self, goal_index: usize) {
        self.integration.fill(UNREACHED);
        self.queued.fill(false);
        self.open.clear();

        self.integration[goal_index] = self.costs[goal_index] as u16;
        self.open.push_back(goal_index);
        self.queued[goal_index] = true;

        while let Some(current) = self.open.pop_front() {
            self.queued[current] = false;
            let here = self.integration[current] as u32;
            let cell = self.dims.cell_at(current);
            for (_, n) in neighbours_flat(cell, self.dims, &CARDINAL) {
                let cost = self.costs[n];
                if cost == BLOCKED_COST {
                    continue;
                }
                let candidate = here + cost as u32;
                if candidate < self.integration[n] as u32 {
                    // GridDims caps the cell count so unit-cost paths
                    // stay below the sentinel.
                    debug_assert!(candidate < UNREACHED as u32);
                    self.integration[n] = candidate as u16;
                    if !self.queued[n] {
                        self.queued[n] = true;
                        self.open.push_back(n);
                    }
                }
            }
        }
    }

    // ── Stage 3: flow ──────────────────────────────────────────────

    fn build_flow(&mut self) {
        for i in 0..self.flow.len() {
            let cell = self.dims.cell_at(i);
            let mut lowest = self.integration[i];
            let mut best = None;
            for (k, n) in neighbours_flat(cell, self.dims, &ALL) {
                let value = self.integration[n];
                if value < lowest {
                    lowest = value;
                    best = Some(k);
                }
            }
            self.flow[i] = match best {
                Some(k) => FlowVector::from_offset(ALL[k].0, ALL[k].1),
                None => FlowVector::ZERO,
            };
        }
    }

    /// Zero any component whose axis-aligned neighbour is unreached, so
    /// diagonals never slip between two solid corners.
    fn trim_corner_cuts(&mut self) {
        for i in 0..self.flow.len() {
            let v = self.flow[i];
            if v.is_zero() {
                continue;
            }
            let cell = self.dims.cell_at(i);
            let mut trimmed = v;
            if v.x != 0 && self.integration_at(cell.offset(v.x as i32, 0)) == UNREACHED {
                trimmed.x = 0;
            }
            if v.y != 0 && self.integration_at(cell.offset(0, v.y as i32)) == UNREACHED {
                trimmed.y = 0;
            }
            self.flow[i] = trimmed;
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Direction to move from `cell`. Zero outside the grid.
    pub fn flow_at(&self, cell: Cell) -> FlowVector {
        self.dims
            .index(cell)
            .map_or(FlowVector::ZERO, |i| self.flow[i])
    }

    /// Direction to move from the tile containing world position
    /// `(x, y)`, for square tiles of side `tile_size`. No interpolation.
    pub fn flow_at_world(&self, x: f32, y: f32, tile_size: f32) -> FlowVector {
        self.flow_at(Cell::from_world(x, y, tile_size))
    }

    /// Traversal cost of `cell`. [`BLOCKED_COST`] outside the grid.
    pub fn cost_at(&self, cell: Cell) -> u8 {
        self.dims
            .index(cell)
            .map_or(BLOCKED_COST, |i| self.costs[i])
    }

    /// Cumulative cost from the goal to `cell`. [`UNREACHED`] outside
    /// the grid.
    pub fn integration_at(&self, cell: Cell) -> u16 {
        self.dims
            .index(cell)
            .map_or(UNREACHED, |i| self.integration[i])
    }

    /// Whether the last calculation's wavefront reached `cell`.
    pub fn is_reachable(&self, cell: Cell) -> bool {
        self.integration_at(cell) != UNREACHED
    }

    /// Cost buffer, row-major from the bottom row.
    pub fn costs(&self) -> &[u8] {
        &self.costs
    }

    /// Integration buffer, row-major from the bottom row.
    pub fn integrations(&self) -> &[u16] {
        &self.integration
    }

    /// Flow buffer, row-major from the bottom row.
    pub fn flows(&self) -> &[FlowVector] {
        &self.flow
    }

    /// Largest integration value among reached cells, for scaling heat
    /// maps. `None` before the first calculation.
    pub fn max_integration(&self) -> Option<u16> {
        self.integration
            .iter()
            .copied()
            .filter(|&v| v != UNREACHED)
            .max()
    }

    /// Arrow picture of the flow buffer, top row first. Solid cells
    /// render as `#` and the goal as `G`.
    pub fn render_arrows(&self) -> String {
        let w = self.dims.width() as i32;
        let h = self.dims.height() as i32;
        let mut out = String::with_capacity(((w + 1) * h) as usize * 3);
        for row in (0..h).rev() {
            for col in 0..w {
                let cell = Cell::new(col, row);
                let glyph = if Some(cell) == self.goal {
                    'G'
                } else if self.cost_at(cell) == BLOCKED_COST {
                    '#'
                } else {
                    self.flow_at(cell).glyph()
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Debug for FlowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowField")
            .field("width", &self.dims.width())
            .field("height", &self.dims.height())
            .field("goal", &self.goal)
            .finish_non_exhaustive()
    }
}
