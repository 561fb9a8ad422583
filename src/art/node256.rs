// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Largest internal node: children indexed directly by key byte.

use crate::art::inode::NodeHeader;
use crate::art::node48::Node48;
use crate::art::ptr::NodePtr;
use crate::concurrent::cell::SharedCell;
use crate::concurrent::policy::TreePolicy;

pub(crate) struct Node256<P: TreePolicy> {
    pub(crate) header: NodeHeader<P>,
    children: [P::Cell<NodePtr>; 256],
}

impl<P: TreePolicy> Node256<P> {
    pub(crate) const CAPACITY: u16 = 256;
    pub(crate) const MIN_SIZE: u16 = 49;

    /// Grow transition from a full `Node48` plus the entry that did not
    /// fit. Runs under the source node's write lock.
    pub(crate) fn grow_from(source: &Node48<P>, new_byte: u8, new_child: NodePtr) -> Box<Self> {
        let node = Box::new(Self {
            header: NodeHeader::with_prefix_snapshot(
                source.header.prefix.snapshot(),
                Node48::<P>::CAPACITY + 1,
            ),
            children: std::array::from_fn(|_| P::Cell::new(NodePtr::NULL)),
        });
        for (byte, child) in source.entries() {
            node.children[byte as usize].store(child);
        }
        node.children[new_byte as usize].store(new_child);
        node
    }

    /// Key/child pairs in key-byte order; reads must be stable.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (u8, NodePtr)> + '_ {
        (0u16..=255).filter_map(move |byte| {
            let child = self.children[byte as usize].load();
            if child.is_null() {
                None
            } else {
                Some((byte as u8, child))
            }
        })
    }

    pub(crate) fn find_child(&self, byte: u8) -> Option<NodePtr> {
        let child = self.children[byte as usize].load();
        if child.is_null() {
            None
        } else {
            Some(child)
        }
    }

    pub(crate) fn add_to_nonfull(&self, byte: u8, child: NodePtr) {
        debug_assert!(self.children[byte as usize].load().is_null());
        self.children[byte as usize].store(child);
        self.header.count.store(self.header.count.load() + 1);
    }

    pub(crate) fn remove_child(&self, byte: u8) {
        debug_assert!(!self.children[byte as usize].load().is_null());
        self.children[byte as usize].store(NodePtr::NULL);
        self.header.count.store(self.header.count.load() - 1);
    }

    pub(crate) fn set_child(&self, byte: u8, child: NodePtr) {
        debug_assert!(!self.children[byte as usize].load().is_null());
        self.children[byte as usize].store(child);
    }

    pub(crate) fn gte_child(&self, byte: u8) -> Option<(u8, NodePtr)> {
        for b in byte as u16..=255 {
            let child = self.children[b as usize].load();
            if !child.is_null() {
                return Some((b as u8, child));
            }
        }
        None
    }

    pub(crate) fn lte_child(&self, byte: u8) -> Option<(u8, NodePtr)> {
        for b in (0..=byte as u16).rev() {
            let child = self.children[b as usize].load();
            if !child.is_null() {
                return Some((b as u8, child));
            }
        }
        None
    }
}
