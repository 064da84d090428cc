//! Brute-force solvers to check flow fields against.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use eddy_core::{Cell, FlowVector, GridDims, GridOracle};

const UNREACHED: u16 = u16::MAX;

/// Minimum cardinal-path cost from `goal` to every cell by textbook
/// Dijkstra, row-major from the bottom row. The goal costs 0 even if
/// solid; other solid cells are never entered and read `u16::MAX`.
pub fn reference_integration<G: GridOracle + ?Sized>(
    grid: &G,
    dims: GridDims,
    goal: Cell,
) -> Vec<u16> {
    let mut dist = vec![UNREACHED; dims.cell_count()];
    let mut heap = BinaryHeap::new();
    let start = dims.index(goal).expect("goal inside grid");
    dist[start] = 0;
    heap.push(Reverse((0u32, start)));
    while let Some(Reverse((d, i))) = heap.pop() {
        if d > dist[i] as u32 {
            continue;
        }
        let cell = dims.cell_at(i);
        for (dc, dr) in [(0, 1), (1, 0), (0, -1), (-1, 0)] {
            let next = cell.offset(dc, dr);
            let Some(n) = dims.index(next) else { continue };
            if n != start && grid.is_solid(next.col, next.row) {
                continue;
            }
            let nd = d + 1;
            if nd < dist[n] as u32 {
                dist[n] = nd as u16;
                heap.push(Reverse((nd, n)));
            }
        }
    }
    dist
}

/// Outcome of [`follow_flow`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Walk {
    /// Every cell visited, starting cell first.
    pub path: Vec<Cell>,
    /// Whether the walk stopped on the goal.
    pub reached: bool,
    /// Whether the walk stepped onto a cell it had already visited.
    pub cycled: bool,
}

impl Walk {
    /// Number of moves made.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Greedily follow `flow` from `start` until it reaches `goal`, hits a
/// zero vector, revisits a cell or exceeds `max_steps` moves.
pub fn follow_flow<F>(start: Cell, goal: Cell, max_steps: usize, flow: F) -> Walk
where
    F: Fn(Cell) -> FlowVector,
{
    let mut path = vec![start];
    let mut seen = HashSet::from([start]);
    let mut here = start;
    while here != goal && path.len() <= max_steps {
        let v = flow(here);
        if v.is_zero() {
            break;
        }
        let (dx, dy) = v.offset();
        here = here.offset(dx, dy);
        path.push(here);
        if !seen.insert(here) {
            return Walk {
                path,
                reached: false,
                cycled: true,
            };
        }
    }
    Walk {
        reached: here == goal,
        path,
        cycled: false,
    }
}
