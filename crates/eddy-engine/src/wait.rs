//! Pooled one-shot wake-ups for blocking on a single task.
//!
//! Each slot owns a capacity-one channel created the first time the
//! slot is used. Checking a context out and returning it only moves a
//! slot index between the free list and the caller, so blocking on a
//! task in steady state allocates nothing.
//!
//! Slots carry a generation. A returned slot's generation is bumped and
//! any pending signal is flushed, so a late completion for an abandoned
//! wait cannot wake the slot's next user.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

struct WaitSlot {
    generation: u32,
    tx: Sender<()>,
    rx: Receiver<()>,
}

#[derive(Default)]
struct WaitSlots {
    slots: Vec<WaitSlot>,
    free: Vec<usize>,
}

/// Registry of reusable wait slots, shared by a pool and its contexts.
#[derive(Default)]
pub(crate) struct WaitRegistry {
    inner: Mutex<WaitSlots>,
}

/// Identifies the wait slot a task should signal on completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WaitTicket {
    slot: usize,
    generation: u32,
}

impl WaitRegistry {
    pub(crate) fn checkout(self: &Arc<Self>) -> WaitContext {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = match inner.free.pop() {
            Some(slot) => slot,
            None => {
                let (tx, rx) = crossbeam_channel::bounded(1);
                inner.slots.push(WaitSlot {
                    generation: 0,
                    tx,
                    rx,
                });
                inner.slots.len() - 1
            }
        };
        let entry = &inner.slots[slot];
        WaitContext {
            registry: Arc::clone(self),
            ticket: WaitTicket {
                slot,
                generation: entry.generation,
            },
            signal: entry.rx.clone(),
            bound: false,
        }
    }

    /// Wake the context holding `ticket`, if it still does.
    pub(crate) fn signal(&self, ticket: WaitTicket) {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = inner.slots.get(ticket.slot) {
            if entry.generation == ticket.generation {
                // Capacity one: a second signal for the same wait is moot.
                let _ = entry.tx.try_send(());
            }
        }
    }

    fn release(&self, ticket: WaitTicket) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = inner.slots.get_mut(ticket.slot) else {
            return;
        };
        if entry.generation != ticket.generation {
            return;
        }
        entry.generation = entry.generation.wrapping_add(1);
        while entry.rx.try_recv().is_ok() {}
        inner.free.push(ticket.slot);
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .slots
            .len()
    }
}

/// A one-shot wait on a single task, obtained from
/// [`WorkerPool::wait_context`](crate::WorkerPool::wait_context).
///
/// Pass it to [`WorkerPool::add_task`](crate::WorkerPool::add_task),
/// then call [`wait`](Self::wait). The wait returns once the task has
/// finished running and is parked for delivery; the owner still has to
/// drain to run its completion. Dropping the context without waiting
/// returns its slot to the pool.
pub struct WaitContext {
    registry: Arc<WaitRegistry>,
    ticket: WaitTicket,
    signal: Receiver<()>,
    bound: bool,
}

impl WaitContext {
    /// Attach this context to a task being submitted.
    ///
    /// # Panics
    ///
    /// Panics if the context is already attached to another task; each
    /// context wakes exactly one wait.
    pub(crate) fn bind(&mut self) -> WaitTicket {
        assert!(!self.bound, "WaitContext is already bound to a task");
        self.bound = true;
        self.ticket
    }

    /// Whether this context was checked out of `registry`.
    pub(crate) fn is_from(&self, registry: &Arc<WaitRegistry>) -> bool {
        Arc::ptr_eq(&self.registry, registry)
    }

    /// Whether a task has been submitted with this context.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Block until the bound task completes. Returns immediately if no
    /// task was bound.
    pub fn wait(self) {
        if self.bound {
            // The registry keeps the sender alive for as long as this
            // context holds it, so recv only returns on a signal.
            let _ = self.signal.recv();
        }
    }

    /// Block until the bound task completes or `timeout` elapses.
    /// Returns `true` if the task completed.
    pub fn wait_timeout(self, timeout: Duration) -> bool {
        if !self.bound {
            return true;
        }
        self.signal.recv_timeout(timeout).is_ok()
    }
}

impl Drop for WaitContext {
    fn drop(&mut self) {
        self.registry.release(self.ticket);
    }
}

impl std::fmt::Debug for WaitContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitContext")
            .field("slot", &self.ticket.slot)
            .field("generation", &self.ticket.generation)
            .field("bound", &self.bound)
            .finish()
    }
}
