//! Transactional overlay over contract storage.
//!
//! All writes performed during one invocation land in the overlay, never
//! in the backing store. On HALT the runtime calls [`OverlayCache::commit`]
//! to apply them; on FAULT the overlay is simply dropped and the backing
//! store never observes the aborted invocation. Reads see overlay writes
//! first, deletions as absent, and fall through to the backing store
//! otherwise.

use std::collections::BTreeMap;

use obol_foundation::Result;

use crate::storage::Storage;

/// A buffered write: `Some` is a pending put, `None` a pending deletion.
type PendingWrite = Option<Vec<u8>>;

/// Write buffer layered over a [`Storage`] backing store.
#[derive(Debug)]
pub struct OverlayCache<'a, S: Storage> {
    backing: &'a mut S,
    writes: BTreeMap<Vec<u8>, PendingWrite>,
}

impl<'a, S: Storage> OverlayCache<'a, S> {
    /// Creates an empty overlay over `backing`.
    pub fn new(backing: &'a mut S) -> Self {
        Self {
            backing,
            writes: BTreeMap::new(),
        }
    }

    /// Reads through the overlay: pending writes shadow the backing store.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(Some(value)) => Ok(Some(value.clone())),
            Some(None) => Ok(None),
            None => self.backing.get(key),
        }
    }

    /// Buffers a put. The backing store is untouched until commit.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
    }

    /// Buffers a deletion. The backing store is untouched until commit.
    pub fn delete(&mut self, key: &[u8]) {
        self.writes.insert(key.to_vec(), None);
    }

    /// Number of pending writes.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    /// Applies every pending write to the backing store in key order.
    ///
    /// Consumes the overlay; dropping without calling this discards the
    /// buffered writes.
    pub fn commit(self) -> Result<()> {
        for (key, write) in self.writes {
            match write {
                Some(value) => self.backing.put(&key, &value)?,
                None => self.backing.delete(&key)?,
            }
        }
        Ok(())
    }
}
