// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Internal node holding seventeen to forty-eight children.
//!
//! Indirect layout: a 256-entry byte map from key byte to a slot in the
//! `children` array, with `0xFF` marking an absent byte. Children are not
//! stored in key order; ordered traversal scans the byte map.

use crate::art::inode::NodeHeader;
use crate::art::node16::Node16;
use crate::art::node256::Node256;
use crate::art::ptr::NodePtr;
use crate::concurrent::cell::SharedCell;
use crate::concurrent::policy::TreePolicy;

/// Sentinel in `child_indices` for an unmapped key byte.
const EMPTY: u8 = 0xFF;

pub(crate) struct Node48<P: TreePolicy> {
    pub(crate) header: NodeHeader<P>,
    child_indices: [P::Cell<u8>; 256],
    children: [P::Cell<NodePtr>; 48],
}

impl<P: TreePolicy> Node48<P> {
    pub(crate) const CAPACITY: u16 = 48;
    pub(crate) const MIN_SIZE: u16 = 17;

    fn empty_arrays() -> ([P::Cell<u8>; 256], [P::Cell<NodePtr>; 48]) {
        (
            std::array::from_fn(|_| P::Cell::new(EMPTY)),
            std::array::from_fn(|_| P::Cell::new(NodePtr::NULL)),
        )
    }

    /// Grow transition from a full `Node16` plus the entry that did not
    /// fit. Runs under the source node's write lock.
    pub(crate) fn grow_from(source: &Node16<P>, new_byte: u8, new_child: NodePtr) -> Box<Self> {
        let (child_indices, children) = Self::empty_arrays();
        let node = Box::new(Self {
            header: NodeHeader::with_prefix_snapshot(
                source.header.prefix.snapshot(),
                Node16::<P>::CAPACITY + 1,
            ),
            child_indices,
            children,
        });
        let mut slot = 0usize;
        for (byte, child) in source.entries() {
            node.child_indices[byte as usize].store(slot as u8);
            node.children[slot].store(child);
            slot += 1;
        }
        node.child_indices[new_byte as usize].store(slot as u8);
        node.children[slot].store(new_child);
        debug_assert_eq!(slot + 1, Node16::<P>::CAPACITY as usize + 1);
        node
    }

    /// Shrink transition from a minimum-size `Node256`, skipping the
    /// child being removed. Runs under the source node's write lock.
    pub(crate) fn shrink_from(source: &Node256<P>, remove_byte: u8) -> Box<Self> {
        let (child_indices, children) = Self::empty_arrays();
        let node = Box::new(Self {
            header: NodeHeader::with_prefix_snapshot(
                source.header.prefix.snapshot(),
                Self::CAPACITY,
            ),
            child_indices,
            children,
        });
        let mut slot = 0usize;
        for (byte, child) in source.entries() {
            if byte == remove_byte {
                continue;
            }
            debug_assert!(slot < Self::CAPACITY as usize);
            node.child_indices[byte as usize].store(slot as u8);
            node.children[slot].store(child);
            slot += 1;
        }
        debug_assert_eq!(slot, Self::CAPACITY as usize);
        node
    }

    /// Key/child pairs in key-byte order; reads must be stable.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (u8, NodePtr)> + '_ {
        (0u16..=255).filter_map(move |byte| {
            let slot = self.child_indices[byte as usize].load();
            if slot == EMPTY {
                return None;
            }
            Some((byte as u8, self.children[slot as usize].load()))
        })
    }

    pub(crate) fn find_child(&self, byte: u8) -> Option<NodePtr> {
        let slot = self.child_indices[byte as usize].load();
        // EMPTY, and defensively any out-of-range torn value, reads as a
        // miss so the caller's version check can fail cleanly instead of
        // faulting.
        if slot as usize >= Self::CAPACITY as usize {
            return None;
        }
        let child = self.children[slot as usize].load();
        if child.is_null() {
            None
        } else {
            Some(child)
        }
    }

    pub(crate) fn add_to_nonfull(&self, byte: u8, child: NodePtr) {
        debug_assert_eq!(self.child_indices[byte as usize].load(), EMPTY);
        let count = self.header.count.load();
        debug_assert!(count < Self::CAPACITY);
        // Any free slot will do; removals leave nulls behind.
        for slot in 0..Self::CAPACITY as usize {
            if self.children[slot].load().is_null() {
                self.children[slot].store(child);
                self.child_indices[byte as usize].store(slot as u8);
                self.header.count.store(count + 1);
                return;
            }
        }
        unreachable!("no free slot in non-full node")
    }

    pub(crate) fn remove_child(&self, byte: u8) {
        let slot = self.child_indices[byte as usize].load();
        debug_assert_ne!(slot, EMPTY);
        self.child_indices[byte as usize].store(EMPTY);
        self.children[slot as usize].store(NodePtr::NULL);
        self.header.count.store(self.header.count.load() - 1);
    }

    pub(crate) fn set_child(&self, byte: u8, child: NodePtr) {
        let slot = self.child_indices[byte as usize].load();
        debug_assert_ne!(slot, EMPTY);
        self.children[slot as usize].store(child);
    }

    pub(crate) fn gte_child(&self, byte: u8) -> Option<(u8, NodePtr)> {
        for b in byte as u16..=255 {
            let slot = self.child_indices[b as usize].load();
            if (slot as usize) < Self::CAPACITY as usize {
                let child = self.children[slot as usize].load();
                if !child.is_null() {
                    return Some((b as u8, child));
                }
            }
        }
        None
    }

    pub(crate) fn lte_child(&self, byte: u8) -> Option<(u8, NodePtr)> {
        for b in (0..=byte as u16).rev() {
            let slot = self.child_indices[b as usize].load();
            if (slot as usize) < Self::CAPACITY as usize {
                let child = self.children[slot as usize].load();
                if !child.is_null() {
                    return Some((b as u8, child));
                }
            }
        }
        None
    }
}
