// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Single-threaded index variant.
//!
//! The tree core compiled against the fake lock: no atomics on the hot
//! path, no deferred reclamation, values borrowed straight out of the
//! leaves. Mutations take `&mut self`; the type is deliberately not
//! `Sync`.
//!
//! ## Example Usage
//!
//! ```rust
//! use reedart::{ArtIndex, KeyEncoder};
//!
//! let mut index = ArtIndex::new();
//! let mut enc = KeyEncoder::new();
//!
//! enc.encode_u64(42);
//! assert!(index.insert(enc.view(), b"value")?);
//! assert_eq!(index.get(enc.view()), Some(&b"value"[..]));
//!
//! let mut seen = Vec::new();
//! index.scan(true, |key, _value| {
//!     seen.push(key.to_vec());
//!     false
//! });
//! assert_eq!(seen.len(), 1);
//! # Ok::<(), reedart::ReedError>(())
//! ```

use crate::art::stats::TreeStats;
use crate::art::tree::RadixTree;
use crate::concurrent::policy::SingleThreaded;
use crate::error::ReedResult;
use std::io::{self, Write};

/// In-memory ordered key/value index for exclusive use by one thread.
pub struct ArtIndex {
    tree: RadixTree<SingleThreaded>,
}

impl ArtIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            tree: RadixTree::new(),
        }
    }

    /// Inserts an entry.
    ///
    /// ## Output
    /// - `Ok(true)`: newly inserted
    /// - `Ok(false)`: key already present, index unchanged
    /// - `Err(ValueTooLong | KeyTooLong | KeyEmpty)`: limits violated,
    ///   index unchanged
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> ReedResult<bool> {
        self.tree.insert(key, value)
    }

    /// Removes an entry; `false` when the key is absent.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        self.tree.remove(key)
    }

    /// Borrows the value for `key`; valid until the next mutation.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.tree.get_ref(key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.tree.contains(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// Visits every entry in ascending (`fwd`) or descending key order.
    /// The visitor returning `true` halts the scan.
    pub fn scan<F: FnMut(&[u8], &[u8]) -> bool>(&self, fwd: bool, visitor: F) {
        self.tree.scan(fwd, visitor)
    }

    /// Scans starting at `key`, or at the next (`fwd`) / previous entry
    /// when `key` is absent.
    pub fn scan_from<F: FnMut(&[u8], &[u8]) -> bool>(&self, key: &[u8], fwd: bool, visitor: F) {
        self.tree.scan_from(key, fwd, visitor)
    }

    /// Scans `[from, to)` ascending when `from < to`, `(to, from]`
    /// descending when `from > to`.
    pub fn scan_range<F: FnMut(&[u8], &[u8]) -> bool>(&self, from: &[u8], to: &[u8], visitor: F) {
        self.tree.scan_range(from, to, visitor)
    }

    /// Writes a human-readable dump of the tree structure.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.tree.dump(w)
    }

    /// Structure counters.
    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }
}

impl Default for ArtIndex {
    fn default() -> Self {
        Self::new()
    }
}
