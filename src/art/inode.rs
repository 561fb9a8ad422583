// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Internal-node header and kind dispatch.
//!
//! All four node kinds share a header: the version lock, the
//! path-compressed key prefix, and the child count. `NodeRef` resolves a
//! tagged pointer into a typed reference once and dispatches the common
//! child operations, so the tree algorithms never branch on the kind
//! themselves.

use crate::art::node16::Node16;
use crate::art::node256::Node256;
use crate::art::node4::Node4;
use crate::art::node48::Node48;
use crate::art::prefix::{KeyPrefix, PrefixSnapshot};
use crate::art::ptr::{NodeKind, NodePtr};
use crate::concurrent::cell::SharedCell;
use crate::concurrent::policy::TreePolicy;

/// Fields common to every internal node kind.
pub(crate) struct NodeHeader<P: TreePolicy> {
    pub(crate) lock: P::Lock,
    pub(crate) prefix: KeyPrefix<P>,
    pub(crate) count: P::Cell<u16>,
}

impl<P: TreePolicy> NodeHeader<P> {
    pub(crate) fn new(prefix_bytes: &[u8], prefix_total: usize, count: u16) -> Self {
        Self {
            lock: P::Lock::default(),
            prefix: KeyPrefix::new(prefix_bytes, prefix_total),
            count: P::Cell::new(count),
        }
    }

    pub(crate) fn with_prefix_snapshot(snap: PrefixSnapshot, count: u16) -> Self {
        Self {
            lock: P::Lock::default(),
            prefix: KeyPrefix::from_snapshot(snap),
            count: P::Cell::new(count),
        }
    }
}

/// Typed view of an internal node behind a tagged pointer.
pub(crate) enum NodeRef<'a, P: TreePolicy> {
    N4(&'a Node4<P>),
    N16(&'a Node16<P>),
    N48(&'a Node48<P>),
    N256(&'a Node256<P>),
}

// Reference-holding enum; copyable independent of the policy type.
impl<P: TreePolicy> Clone for NodeRef<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: TreePolicy> Copy for NodeRef<'_, P> {}

impl<'a, P: TreePolicy> NodeRef<'a, P> {
    /// Resolves a tagged pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must address a live internal node of this policy; under the
    /// concurrent policy the caller must be inside a QSBR-protected
    /// window.
    pub(crate) unsafe fn from_ptr(ptr: NodePtr) -> Self {
        match ptr.kind() {
            NodeKind::N4 => NodeRef::N4(ptr.n4_ref()),
            NodeKind::N16 => NodeRef::N16(ptr.n16_ref()),
            NodeKind::N48 => NodeRef::N48(ptr.n48_ref()),
            NodeKind::N256 => NodeRef::N256(ptr.n256_ref()),
            NodeKind::Leaf => unreachable!("leaf pointer in internal dispatch"),
        }
    }

    pub(crate) fn header(self) -> &'a NodeHeader<P> {
        match self {
            NodeRef::N4(n) => &n.header,
            NodeRef::N16(n) => &n.header,
            NodeRef::N48(n) => &n.header,
            NodeRef::N256(n) => &n.header,
        }
    }

    pub(crate) fn lock(self) -> &'a P::Lock {
        &self.header().lock
    }

    pub(crate) fn prefix(self) -> PrefixSnapshot {
        self.header().prefix.snapshot()
    }

    pub(crate) fn count(self) -> u16 {
        self.header().count.load()
    }

    pub(crate) fn kind(self) -> NodeKind {
        match self {
            NodeRef::N4(_) => NodeKind::N4,
            NodeRef::N16(_) => NodeKind::N16,
            NodeRef::N48(_) => NodeKind::N48,
            NodeRef::N256(_) => NodeKind::N256,
        }
    }

    /// Whether an insert must grow the node first.
    pub(crate) fn is_full(self) -> bool {
        let count = self.count();
        match self {
            NodeRef::N4(_) => count >= Node4::<P>::CAPACITY,
            NodeRef::N16(_) => count >= Node16::<P>::CAPACITY,
            NodeRef::N48(_) => count >= Node48::<P>::CAPACITY,
            NodeRef::N256(_) => count >= Node256::<P>::CAPACITY,
        }
    }

    /// The child under `byte`, or `None`. Tolerates torn reads: a stale
    /// index or null slot reads as a miss for the version check to
    /// catch.
    pub(crate) fn find_child(self, byte: u8) -> Option<NodePtr> {
        match self {
            NodeRef::N4(n) => n.find_child(byte),
            NodeRef::N16(n) => n.find_child(byte),
            NodeRef::N48(n) => n.find_child(byte),
            NodeRef::N256(n) => n.find_child(byte),
        }
    }

    /// Adds a child under `byte`; the node must not be full and `byte`
    /// must be absent. Caller holds the write lock.
    pub(crate) fn add_to_nonfull(self, byte: u8, child: NodePtr) {
        debug_assert!(!self.is_full());
        match self {
            NodeRef::N4(n) => n.add_to_nonfull(byte, child),
            NodeRef::N16(n) => n.add_to_nonfull(byte, child),
            NodeRef::N48(n) => n.add_to_nonfull(byte, child),
            NodeRef::N256(n) => n.add_to_nonfull(byte, child),
        }
    }

    /// Deletes the child under `byte`. Caller holds the write lock.
    pub(crate) fn remove_child(self, byte: u8) {
        match self {
            NodeRef::N4(n) => n.remove_child(byte),
            NodeRef::N16(n) => n.remove_child(byte),
            NodeRef::N48(n) => n.remove_child(byte),
            NodeRef::N256(n) => n.remove_child(byte),
        }
    }

    /// Replaces the existing child under `byte`. Caller holds the write
    /// lock.
    pub(crate) fn set_child(self, byte: u8, child: NodePtr) {
        match self {
            NodeRef::N4(n) => n.set_child(byte, child),
            NodeRef::N16(n) => n.set_child(byte, child),
            NodeRef::N48(n) => n.set_child(byte, child),
            NodeRef::N256(n) => n.set_child(byte, child),
        }
    }

    /// First populated child in ascending key-byte order.
    pub(crate) fn begin(self) -> Option<(u8, NodePtr)> {
        self.gte_child(0)
    }

    /// Last populated child in ascending key-byte order.
    pub(crate) fn last(self) -> Option<(u8, NodePtr)> {
        self.lte_child(255)
    }

    /// Smallest populated key byte `>= byte`, with its child.
    pub(crate) fn gte_child(self, byte: u8) -> Option<(u8, NodePtr)> {
        match self {
            NodeRef::N4(n) => n.gte_child(byte),
            NodeRef::N16(n) => n.gte_child(byte),
            NodeRef::N48(n) => n.gte_child(byte),
            NodeRef::N256(n) => n.gte_child(byte),
        }
    }

    /// Largest populated key byte `<= byte`, with its child.
    pub(crate) fn lte_child(self, byte: u8) -> Option<(u8, NodePtr)> {
        match self {
            NodeRef::N4(n) => n.lte_child(byte),
            NodeRef::N16(n) => n.lte_child(byte),
            NodeRef::N48(n) => n.lte_child(byte),
            NodeRef::N256(n) => n.lte_child(byte),
        }
    }

    /// Next populated child strictly after `byte`.
    pub(crate) fn next_child(self, byte: u8) -> Option<(u8, NodePtr)> {
        if byte == 255 {
            return None;
        }
        self.gte_child(byte + 1)
    }

    /// Previous populated child strictly before `byte`.
    pub(crate) fn prior_child(self, byte: u8) -> Option<(u8, NodePtr)> {
        if byte == 0 {
            return None;
        }
        self.lte_child(byte - 1)
    }
}
