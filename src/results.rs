//! Slot-addressed, duplicate-free track collection.
//!
//! A [`ResultSet`] has one slot per input query. Each slot holds at most one
//! committed track id, and a reverse index guarantees that a track id is held
//! by at most one slot at any time. Reading the set back with
//! [`ResultSet::slice`] yields the committed ids in slot order, so the final
//! playlist mirrors the order of the input list regardless of the order in
//! which searches finished.
//!
//! All operations lock a single mutex for their whole duration, which makes
//! the check-then-write sequence of [`ResultSet::add`] atomic with respect to
//! concurrent callers.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

#[derive(Debug, Default)]
struct Slots {
    list: Vec<Option<String>>,
    index: HashMap<String, usize>,
}

/// Concurrency-safe, fixed-capacity set of committed track ids.
#[derive(Debug, Default)]
pub struct ResultSet {
    inner: Mutex<Slots>,
}

impl ResultSet {
    /// Creates a set with `size` empty slots.
    pub fn new(size: usize) -> Self {
        Self {
            inner: Mutex::new(Slots {
                list: vec![None; size],
                index: HashMap::with_capacity(size),
            }),
        }
    }

    /// Commits `id` into `slot`.
    ///
    /// Returns `(true, None)` when the id was stored (or was already stored in
    /// this very slot). Returns `(false, Some(j))` when another slot `j` already
    /// holds the id, and `(false, None)` for an empty id. A rejected add leaves
    /// the set untouched.
    ///
    /// Overwriting a slot releases the id it previously held, so that id can be
    /// claimed by another slot afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range. Slots are always derived from the
    /// position of a query in the input list, so an invalid slot is a bug.
    pub fn add(&self, slot: usize, id: &str) -> (bool, Option<usize>) {
        let mut inner = self.lock();

        let size = inner.list.len();
        assert!(slot < size, "slot {slot} out of range for result set of size {size}");

        if id.is_empty() {
            return (false, None);
        }

        if let Some(&owner) = inner.index.get(id) {
            return if owner == slot {
                (true, None)
            } else {
                (false, Some(owner))
            };
        }

        if let Some(old) = inner.list[slot].replace(id.to_string()) {
            inner.index.remove(&old);
        }
        inner.index.insert(id.to_string(), slot);

        (true, None)
    }

    /// Snapshot of the committed ids in ascending slot order, empty slots skipped.
    pub fn slice(&self) -> Vec<String> {
        self.lock().list.iter().flatten().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().index.is_empty()
    }

    /// Number of committed ids.
    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    /// Number of slots, committed or not.
    pub fn capacity(&self) -> usize {
        self.lock().list.len()
    }

    // A panic while holding the lock can only come from the range assertion,
    // which fires before any mutation, so a poisoned state is still consistent.
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
