//! Oracle wrappers for concurrency and fault tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use eddy_core::{Cell, GridOracle};

/// Counts every query passed through to the inner oracle.
pub struct CountingOracle<G> {
    pub inner: G,
    queries: AtomicUsize,
}

impl<G: GridOracle> CountingOracle<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl<G: GridOracle> GridOracle for CountingOracle<G> {
    fn is_solid(&self, col: i32, row: i32) -> bool {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.inner.is_solid(col, row)
    }
}

/// Panics when asked about one particular cell while armed.
///
/// Used to check that a panicking computation is captured as a task
/// fault instead of taking down a worker thread. Starts armed.
pub struct FaultingOracle<G> {
    pub inner: G,
    pub poison: Cell,
    armed: AtomicBool,
}

impl<G: GridOracle> FaultingOracle<G> {
    pub fn new(inner: G, poison: Cell) -> Self {
        Self {
            inner,
            poison,
            armed: AtomicBool::new(true),
        }
    }

    pub fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::SeqCst);
    }
}

impl<G: GridOracle> GridOracle for FaultingOracle<G> {
    fn is_solid(&self, col: i32, row: i32) -> bool {
        if Cell::new(col, row) == self.poison && self.armed.load(Ordering::SeqCst) {
            panic!("oracle poisoned at {}", self.poison);
        }
        self.inner.is_solid(col, row)
    }
}

/// Sleeps before the first query of every calculation-sized batch so
/// computations overlap long enough to observe concurrency.
pub struct SlowOracle<G> {
    pub inner: G,
    pub delay: Duration,
    pub every: usize,
    queries: AtomicUsize,
}

impl<G: GridOracle> SlowOracle<G> {
    pub fn new(inner: G, delay: Duration, every: usize) -> Self {
        Self {
            inner,
            delay,
            every: every.max(1),
            queries: AtomicUsize::new(0),
        }
    }
}

impl<G: GridOracle> GridOracle for SlowOracle<G> {
    fn is_solid(&self, col: i32, row: i32) -> bool {
        if self.queries.fetch_add(1, Ordering::Relaxed) % self.every == 0 {
            std::thread::sleep(self.delay);
        }
        self.inner.is_solid(col, row)
    }
}
