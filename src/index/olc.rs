// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Lock-free concurrent index variant.
//!
//! The tree core compiled against the optimistic version lock: any
//! number of readers proceed without writing shared state, writers take
//! per-node write locks only around the nodes they change, and every
//! conflict retries internally. Unlinked nodes are retired through QSBR
//! and freed once every registered thread has passed a quiescent state.
//!
//! ## Thread contract
//!
//! Threads operating on the index register with
//! [`qsbr::register_current_thread`](crate::qsbr::register_current_thread)
//! and periodically call [`qsbr::quiescent`](crate::qsbr::quiescent)
//! while holding no values or scans from the index. Point operations are
//! linearisable; scans are snapshot-consistent per node, not globally.
//!
//! ## Example Usage
//!
//! ```rust
//! use reedart::{qsbr, KeyEncoder, OlcIndex};
//!
//! let index = OlcIndex::new();
//! qsbr::register_current_thread();
//!
//! let mut enc = KeyEncoder::new();
//! enc.encode_u64(7);
//! index.insert(enc.view(), b"seven")?;
//! assert_eq!(index.get(enc.view()), Some(b"seven".to_vec()));
//!
//! qsbr::quiescent();
//! qsbr::unregister_current_thread();
//! # Ok::<(), reedart::ReedError>(())
//! ```

use crate::art::stats::TreeStats;
use crate::art::tree::RadixTree;
use crate::concurrent::policy::Concurrent;
use crate::error::ReedResult;
use std::io::{self, Write};

/// In-memory ordered key/value index shared between threads without a
/// global lock.
pub struct OlcIndex {
    tree: RadixTree<Concurrent>,
}

impl OlcIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            tree: RadixTree::new(),
        }
    }

    /// Inserts an entry; `Ok(false)` reports a duplicate key. Retries
    /// internally on conflicts with concurrent writers.
    pub fn insert(&self, key: &[u8], value: &[u8]) -> ReedResult<bool> {
        self.tree.insert(key, value)
    }

    /// Removes an entry; `false` when the key is absent.
    pub fn remove(&self, key: &[u8]) -> bool {
        self.tree.remove(key)
    }

    /// Copies out the value for `key`. The copy is taken inside the
    /// validated read section, so it is consistent with one moment of
    /// the entry's lifetime.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.tree.get_with(key, |v| v.to_vec())
    }

    /// Runs `f` over the value for `key` without copying. The reference
    /// is only valid inside `f`; the calling thread must not signal
    /// quiescence concurrently.
    pub fn get_with<R, F: FnOnce(&[u8]) -> R>(&self, key: &[u8], f: F) -> Option<R> {
        self.tree.get_with(key, f)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.tree.contains(key)
    }

    /// Number of entries. Exact only at quiescent moments.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every entry. Exclusive access; the `&mut` receiver
    /// guarantees no concurrent operation is in flight.
    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// Visits every entry in ascending (`fwd`) or descending key order.
    /// Entries mutated elsewhere in the tree during the scan may or may
    /// not be observed.
    pub fn scan<F: FnMut(&[u8], &[u8]) -> bool>(&self, fwd: bool, visitor: F) {
        self.tree.scan(fwd, visitor)
    }

    /// Scans starting at `key`, or at the adjacent entry when absent.
    pub fn scan_from<F: FnMut(&[u8], &[u8]) -> bool>(&self, key: &[u8], fwd: bool, visitor: F) {
        self.tree.scan_from(key, fwd, visitor)
    }

    /// Scans `[from, to)` ascending or `(to, from]` descending.
    pub fn scan_range<F: FnMut(&[u8], &[u8]) -> bool>(&self, from: &[u8], to: &[u8], visitor: F) {
        self.tree.scan_range(from, to, visitor)
    }

    /// Writes a human-readable dump. Exclusive access via `&mut`.
    pub fn dump<W: Write>(&mut self, w: &mut W) -> io::Result<()> {
        self.tree.dump(w)
    }

    /// Structure counters. Exact only at quiescent moments.
    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }
}

impl Default for OlcIndex {
    fn default() -> Self {
        Self::new()
    }
}
