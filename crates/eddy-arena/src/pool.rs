//! Factory-filled object pool.
//!
//! [`ObjectPool`] owns a set of reusable instances. `allocate` hands out
//! a [`PoolHandle`] to an available instance; `deallocate` makes it
//! available again without resetting it. An allocated instance can be
//! [`detach`](ObjectPool::detach)ed to move it onto another thread and
//! [`attach`](ObjectPool::attach)ed back when the work is done; its slot
//! stays reserved in between, so the pool never hands it to a second
//! owner.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::{Growth, PoolConfig};
use crate::error::PoolError;
use crate::handle::PoolHandle;

static POOL_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Available,
    Allocated,
    Detached,
}

struct Slot<T> {
    /// `None` only while detached.
    item: Option<T>,
    generation: u32,
    state: SlotState,
}

/// Pool of reusable `T` created by a factory.
///
/// Released instances keep their contents: the pool promises that the
/// instance is free for a new logical use, not that it is pristine.
/// Callers that need a clean instance reset it after allocating.
///
/// The pool is not synchronised. The intended discipline is that one
/// owning thread allocates, deallocates and attaches, while other
/// threads only ever see detached instances.
pub struct ObjectPool<T> {
    id: u32,
    slots: Vec<Slot<T>>,
    /// Stack of available slot indices; the most recently released
    /// instance is reused first.
    available: Vec<usize>,
    allocated: usize,
    detached: usize,
    growth: Growth,
    factory: Box<dyn FnMut() -> T + Send>,
}

impl<T> ObjectPool<T> {
    /// Create a pool pre-filled with `initial` instances from `factory`.
    pub fn new<F>(initial: usize, growth: Growth, mut factory: F) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        let mut slots = Vec::with_capacity(initial);
        let mut available = Vec::with_capacity(initial);
        for index in 0..initial {
            slots.push(Slot {
                item: Some(factory()),
                generation: 0,
                state: SlotState::Available,
            });
            // Pop order hands out index 0 first.
            available.push(initial - 1 - index);
        }
        Self {
            id: POOL_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            slots,
            available,
            allocated: 0,
            detached: 0,
            growth,
            factory: Box::new(factory),
        }
    }

    /// Create a pool from a validated [`PoolConfig`].
    pub fn from_config<F>(config: &PoolConfig, factory: F) -> Result<Self, PoolError>
    where
        F: FnMut() -> T + Send + 'static,
    {
        config.validate()?;
        Ok(Self::new(config.initial, config.growth, factory))
    }

    /// Take an available instance.
    ///
    /// Returns `None` when the pool is exhausted and [`Growth::Fixed`].
    /// This is an expected outcome, not an error: back off or retry
    /// after releasing something.
    pub fn allocate(&mut self) -> Option<PoolHandle> {
        let index = match self.available.pop() {
            Some(index) => index,
            None if self.growth == Growth::Growable => {
                let index = self.slots.len();
                self.slots.push(Slot {
                    item: Some((self.factory)()),
                    generation: 0,
                    state: SlotState::Available,
                });
                self.available.reserve(self.slots.len() - self.available.len());
                tracing::debug!(pool = self.id, capacity = self.slots.len(), "object pool grew");
                index
            }
            None => return None,
        };
        let slot = &mut self.slots[index];
        slot.state = SlotState::Allocated;
        self.allocated += 1;
        Some(PoolHandle {
            pool: self.id,
            index: index as u32,
            generation: slot.generation,
        })
    }

    /// Release an allocated instance back to the pool.
    ///
    /// # Panics
    ///
    /// Panics on a stale or foreign handle (including releasing twice)
    /// and on a detached instance. These are caller bugs.
    pub fn deallocate(&mut self, handle: PoolHandle) {
        if let Err(e) = self.try_deallocate(handle) {
            panic!("ObjectPool::deallocate: {e}");
        }
    }

    /// Non-panicking form of [`deallocate`](Self::deallocate).
    pub fn try_deallocate(&mut self, handle: PoolHandle) -> Result<(), PoolError> {
        let index = self.check(handle)?;
        if self.slots[index].state == SlotState::Detached {
            return Err(PoolError::Detached { handle });
        }
        self.release(index);
        Ok(())
    }

    /// Release every allocated instance in one pass.
    ///
    /// Detached instances are not in the pool and are left alone; they
    /// must be attached and released individually. Returns the number
    /// of instances released. Every handle to a released instance goes
    /// stale.
    pub fn deallocate_all(&mut self) -> usize {
        let mut released = 0;
        for index in 0..self.slots.len() {
            if self.slots[index].state == SlotState::Allocated {
                self.release(index);
                released += 1;
            }
        }
        released
    }

    /// Move an allocated instance out of the pool.
    ///
    /// The slot stays reserved until [`attach`](Self::attach) puts the
    /// instance back.
    ///
    /// # Panics
    ///
    /// Panics on a stale or foreign handle, or if already detached.
    pub fn detach(&mut self, handle: PoolHandle) -> T {
        match self.try_detach(handle) {
            Ok(item) => item,
            Err(e) => panic!("ObjectPool::detach: {e}"),
        }
    }

    /// Non-panicking form of [`detach`](Self::detach).
    pub fn try_detach(&mut self, handle: PoolHandle) -> Result<T, PoolError> {
        let index = self.check(handle)?;
        let slot = &mut self.slots[index];
        match (slot.state, slot.item.take()) {
            (SlotState::Allocated, Some(item)) => {
                slot.state = SlotState::Detached;
                self.detached += 1;
                Ok(item)
            }
            _ => Err(PoolError::Detached { handle }),
        }
    }

    /// Return a detached instance to its reserved slot.
    ///
    /// The instance stays allocated; release it with
    /// [`deallocate`](Self::deallocate) when its owner is done.
    ///
    /// # Panics
    ///
    /// Panics on a stale or foreign handle, or if the slot was not
    /// detached.
    pub fn attach(&mut self, handle: PoolHandle, item: T) {
        if let Err(e) = self.try_attach(handle, item) {
            panic!("ObjectPool::attach: {e}");
        }
    }

    /// Non-panicking form of [`attach`](Self::attach).
    ///
    /// On error the item is dropped.
    pub fn try_attach(&mut self, handle: PoolHandle, item: T) -> Result<(), PoolError> {
        let index = self.check(handle)?;
        let slot = &mut self.slots[index];
        if slot.state != SlotState::Detached {
            return Err(PoolError::NotDetached { handle });
        }
        slot.item = Some(item);
        slot.state = SlotState::Allocated;
        self.detached -= 1;
        Ok(())
    }

    /// Shared access to an allocated, attached instance.
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let index = self.check(handle).ok()?;
        let slot = &self.slots[index];
        match slot.state {
            SlotState::Allocated => slot.item.as_ref(),
            _ => None,
        }
    }

    /// Exclusive access to an allocated, attached instance.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let index = self.check(handle).ok()?;
        let slot = &mut self.slots[index];
        match slot.state {
            SlotState::Allocated => slot.item.as_mut(),
            _ => None,
        }
    }

    /// Whether `handle` refers to a currently allocated instance.
    pub fn is_allocated(&self, handle: PoolHandle) -> bool {
        self.check(handle).is_ok()
    }

    /// Instances ready to be allocated without calling the factory.
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Instances currently allocated, detached ones included.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Instances currently detached.
    pub fn detached(&self) -> usize {
        self.detached
    }

    /// Total instances the pool has created.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The growth policy.
    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Resolve a handle to a slot index if it names an allocated slot.
    fn check(&self, handle: PoolHandle) -> Result<usize, PoolError> {
        if handle.pool != self.id {
            return Err(PoolError::ForeignHandle { handle });
        }
        match self.slots.get(handle.index()) {
            Some(slot)
                if slot.generation == handle.generation && slot.state != SlotState::Available =>
            {
                Ok(handle.index())
            }
            _ => Err(PoolError::StaleHandle { handle }),
        }
    }

    fn release(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.state = SlotState::Available;
        slot.generation = slot.generation.wrapping_add(1);
        self.allocated -= 1;
        self.available.push(index);
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("id", &self.id)
            .field("capacity", &self.slots.len())
            .field("available", &self.available.len())
            .field("allocated", &self.allocated)
            .field("detached", &self.detached)
            .field("growth", &self.growth)
            .finish()
    }
}
