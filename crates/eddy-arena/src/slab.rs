//! Index-addressed storage with a free list.
//!
//! [`Slab`] stores values in a `Vec` of entries and recycles vacated
//! entries through a LIFO free list. After the slab has grown to its
//! high-water mark, insert and remove never touch the allocator, which
//! keeps per-task bookkeeping allocation-free in steady state.

use crate::handle::SlotKey;

enum Entry<T> {
    Occupied { value: T, generation: u32 },
    Vacant { generation: u32 },
}

/// Generational slab allocator.
///
/// Every removal bumps the entry's generation, so a [`SlotKey`] held
/// past its removal no longer resolves.
pub struct Slab<T> {
    entries: Vec<Entry<T>>,
    /// Indices of vacant entries, most recently vacated last.
    free_list: Vec<usize>,
    len: usize,
}

impl<T> Slab<T> {
    /// Create an empty slab.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a slab with room for `capacity` values before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free_list: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Number of occupied entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no entry is occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of entries ever created (occupied + vacant).
    pub fn slots(&self) -> usize {
        self.entries.len()
    }

    /// Store `value`, reusing a vacant entry when one exists.
    pub fn insert(&mut self, value: T) -> SlotKey {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let generation = match self.entries[index] {
                Entry::Vacant { generation } => generation,
                Entry::Occupied { .. } => unreachable!("free list points at occupied entry"),
            };
            self.entries[index] = Entry::Occupied { value, generation };
            return SlotKey {
                index: index as u32,
                generation,
            };
        }
        let index = self.entries.len();
        self.entries.push(Entry::Occupied {
            value,
            generation: 0,
        });
        // Keep the free list able to hold every entry without regrowing.
        self.free_list
            .reserve(self.entries.len() - self.free_list.len());
        SlotKey {
            index: index as u32,
            generation: 0,
        }
    }

    /// Remove and return the value for `key`, or `None` if stale.
    pub fn remove(&mut self, key: SlotKey) -> Option<T> {
        let index = key.index();
        match self.entries.get(index) {
            Some(Entry::Occupied { generation, .. }) if *generation == key.generation => {}
            _ => return None,
        }
        let next = Entry::Vacant {
            generation: key.generation.wrapping_add(1),
        };
        let old = std::mem::replace(&mut self.entries[index], next);
        self.free_list.push(index);
        self.len -= 1;
        match old {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Whether `key` refers to a live entry.
    pub fn contains(&self, key: SlotKey) -> bool {
        self.get(key).is_some()
    }

    /// Shared access to the value for `key`.
    pub fn get(&self, key: SlotKey) -> Option<&T> {
        match self.entries.get(key.index()) {
            Some(Entry::Occupied { value, generation }) if *generation == key.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Exclusive access to the value for `key`.
    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        match self.entries.get_mut(key.index()) {
            Some(Entry::Occupied { value, generation }) if *generation == key.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Iterate over live entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| match e {
                Entry::Occupied { value, generation } => Some((
                    SlotKey {
                        index: i as u32,
                        generation: *generation,
                    },
                    value,
                )),
                Entry::Vacant { .. } => None,
            })
    }
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}
