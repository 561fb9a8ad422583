// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tree statistics.
//!
//! Per-kind node counts, transition counts and resident bytes,
//! maintained on every structural change. Counters are relaxed atomics
//! in both variants; the snapshot is only exact at quiescent moments.

use crate::art::ptr::NodeKind;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of a tree's structure counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub leaf_count: u64,
    pub node4_count: u64,
    pub node16_count: u64,
    pub node48_count: u64,
    pub node256_count: u64,
    pub grow_count: u64,
    pub shrink_count: u64,
    pub prefix_split_count: u64,
    pub resident_bytes: u64,
}

impl TreeStats {
    /// Total internal nodes of all kinds.
    pub fn inode_count(&self) -> u64 {
        self.node4_count + self.node16_count + self.node48_count + self.node256_count
    }
}

/// Live counters behind a tree.
#[derive(Default)]
pub(crate) struct TreeCounters {
    leaf_count: AtomicU64,
    node4_count: AtomicU64,
    node16_count: AtomicU64,
    node48_count: AtomicU64,
    node256_count: AtomicU64,
    grow_count: AtomicU64,
    shrink_count: AtomicU64,
    prefix_split_count: AtomicU64,
    resident_bytes: AtomicU64,
}

impl TreeCounters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn kind_counter(&self, kind: NodeKind) -> &AtomicU64 {
        match kind {
            NodeKind::Leaf => &self.leaf_count,
            NodeKind::N4 => &self.node4_count,
            NodeKind::N16 => &self.node16_count,
            NodeKind::N48 => &self.node48_count,
            NodeKind::N256 => &self.node256_count,
        }
    }

    pub(crate) fn node_created(&self, kind: NodeKind, bytes: usize) {
        self.kind_counter(kind).fetch_add(1, Ordering::Relaxed);
        self.resident_bytes
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn node_dropped(&self, kind: NodeKind, bytes: usize) {
        self.kind_counter(kind).fetch_sub(1, Ordering::Relaxed);
        self.resident_bytes
            .fetch_sub(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn grew(&self) {
        self.grow_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn shrank(&self) {
        self.shrink_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn prefix_split(&self) {
        self.prefix_split_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn leaf_count(&self) -> u64 {
        self.leaf_count.load(Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self) -> TreeStats {
        TreeStats {
            leaf_count: self.leaf_count.load(Ordering::Relaxed),
            node4_count: self.node4_count.load(Ordering::Relaxed),
            node16_count: self.node16_count.load(Ordering::Relaxed),
            node48_count: self.node48_count.load(Ordering::Relaxed),
            node256_count: self.node256_count.load(Ordering::Relaxed),
            grow_count: self.grow_count.load(Ordering::Relaxed),
            shrink_count: self.shrink_count.load(Ordering::Relaxed),
            prefix_split_count: self.prefix_split_count.load(Ordering::Relaxed),
            resident_bytes: self.resident_bytes.load(Ordering::Relaxed),
        }
    }

    /// Zeroes the structure counters after `clear`; the transition
    /// counters keep their history.
    pub(crate) fn reset_structure(&self) {
        self.leaf_count.store(0, Ordering::Relaxed);
        self.node4_count.store(0, Ordering::Relaxed);
        self.node16_count.store(0, Ordering::Relaxed);
        self.node48_count.store(0, Ordering::Relaxed);
        self.node256_count.store(0, Ordering::Relaxed);
        self.resident_bytes.store(0, Ordering::Relaxed);
    }
}
