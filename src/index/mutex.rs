// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Mutex-serialised index variant.
//!
//! The single-threaded core behind one coarse `std::sync::Mutex`: every
//! operation takes the lock for its whole duration. Values are copied
//! out while the lock is held. The simplest correct shared index, and
//! the baseline the optimistic variant is measured against.

use crate::art::stats::TreeStats;
use crate::art::tree::RadixTree;
use crate::concurrent::policy::SingleThreaded;
use crate::error::ReedResult;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

/// In-memory ordered key/value index serialised behind one mutex.
pub struct MutexIndex {
    inner: Mutex<RadixTree<SingleThreaded>>,
}

impl MutexIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RadixTree::new()),
        }
    }

    fn tree(&self) -> MutexGuard<'_, RadixTree<SingleThreaded>> {
        // A poisoning panic cannot leave the tree structurally torn:
        // the single-threaded core completes each mutation before
        // returning.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Inserts an entry; `Ok(false)` reports a duplicate key.
    pub fn insert(&self, key: &[u8], value: &[u8]) -> ReedResult<bool> {
        self.tree().insert(key, value)
    }

    /// Removes an entry; `false` when the key is absent.
    pub fn remove(&self, key: &[u8]) -> bool {
        self.tree().remove(key)
    }

    /// Copies out the value for `key`.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.tree().get_with(key, |v| v.to_vec())
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.tree().contains(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.tree().len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.tree().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.tree().clear()
    }

    /// Visits every entry in key order while holding the lock.
    pub fn scan<F: FnMut(&[u8], &[u8]) -> bool>(&self, fwd: bool, visitor: F) {
        self.tree().scan(fwd, visitor)
    }

    /// Scans starting at `key`, or at the adjacent entry when absent.
    pub fn scan_from<F: FnMut(&[u8], &[u8]) -> bool>(&self, key: &[u8], fwd: bool, visitor: F) {
        self.tree().scan_from(key, fwd, visitor)
    }

    /// Scans `[from, to)` ascending or `(to, from]` descending.
    pub fn scan_range<F: FnMut(&[u8], &[u8]) -> bool>(&self, from: &[u8], to: &[u8], visitor: F) {
        self.tree().scan_range(from, to, visitor)
    }

    /// Writes a human-readable dump of the tree structure.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.tree().dump(w)
    }

    /// Structure counters.
    pub fn stats(&self) -> TreeStats {
        self.tree().stats()
    }
}

impl Default for MutexIndex {
    fn default() -> Self {
        Self::new()
    }
}
