//! Generation-checked keys.
//!
//! A key pairs a slot index with the generation the slot had when the
//! key was issued. Releasing a slot bumps its generation, so every key
//! issued before the release becomes stale and fails lookups.

use std::fmt;

/// Key into a [`Slab`](crate::Slab).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct SlotKey {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl SlotKey {
    /// Slot index within the slab.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this key was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Handle to an instance allocated from an [`ObjectPool`](crate::ObjectPool).
///
/// Carries the id of the issuing pool so a handle presented to the
/// wrong pool is rejected instead of resolving to an unrelated slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct PoolHandle {
    pub(crate) pool: u32,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl PoolHandle {
    /// Slot index within the pool.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool{}:{}v{}", self.pool, self.index, self.generation)
    }
}
