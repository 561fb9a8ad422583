// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Smallest internal node: up to four children.
//!
//! Sorted `keys` array with a parallel `children` array, same index in
//! both. Child lookup compares all four key bytes at once in a single
//! 32-bit word; masked to the child count this is branch-free, with the
//! sorted-scan path as the structural reference.

use crate::art::inode::NodeHeader;
use crate::art::node16::Node16;
use crate::art::ptr::NodePtr;
use crate::concurrent::cell::SharedCell;
use crate::concurrent::policy::TreePolicy;

pub(crate) struct Node4<P: TreePolicy> {
    pub(crate) header: NodeHeader<P>,
    keys: [P::Cell<u8>; 4],
    children: [P::Cell<NodePtr>; 4],
}

impl<P: TreePolicy> Node4<P> {
    pub(crate) const CAPACITY: u16 = 4;
    pub(crate) const MIN_SIZE: u16 = 2;

    fn empty_arrays() -> ([P::Cell<u8>; 4], [P::Cell<NodePtr>; 4]) {
        (
            std::array::from_fn(|_| P::Cell::new(0u8)),
            std::array::from_fn(|_| P::Cell::new(NodePtr::NULL)),
        )
    }

    /// A fresh node holding two children, in key order.
    ///
    /// Covers both the leaf/leaf split and the prefix split, which each
    /// produce a two-child node above the diverging byte.
    pub(crate) fn new_with_two(
        prefix_bytes: &[u8],
        prefix_total: usize,
        byte_a: u8,
        child_a: NodePtr,
        byte_b: u8,
        child_b: NodePtr,
    ) -> Box<Self> {
        debug_assert_ne!(byte_a, byte_b);
        let (keys, children) = Self::empty_arrays();
        let node = Box::new(Self {
            header: NodeHeader::new(prefix_bytes, prefix_total, 2),
            keys,
            children,
        });
        let (first, second) = if byte_a < byte_b {
            ((byte_a, child_a), (byte_b, child_b))
        } else {
            ((byte_b, child_b), (byte_a, child_a))
        };
        node.keys[0].store(first.0);
        node.children[0].store(first.1);
        node.keys[1].store(second.0);
        node.children[1].store(second.1);
        node
    }

    /// Shrink transition from a minimum-size `Node16`, skipping the
    /// child being removed. Runs under the source node's write lock.
    pub(crate) fn shrink_from(source: &Node16<P>, remove_byte: u8) -> Box<Self> {
        let (keys, children) = Self::empty_arrays();
        let node = Box::new(Self {
            header: NodeHeader::with_prefix_snapshot(
                source.header.prefix.snapshot(),
                Self::CAPACITY,
            ),
            keys,
            children,
        });
        let mut out = 0usize;
        for (byte, child) in source.entries() {
            if byte == remove_byte {
                continue;
            }
            debug_assert!(out < Self::CAPACITY as usize);
            node.keys[out].store(byte);
            node.children[out].store(child);
            out += 1;
        }
        debug_assert_eq!(out, Self::CAPACITY as usize);
        node
    }

    #[inline]
    fn live(&self) -> usize {
        (self.header.count.load() as usize).min(Self::CAPACITY as usize)
    }

    /// Key/child pairs in key order; reads must be stable (write lock
    /// held or single-threaded).
    pub(crate) fn entries(&self) -> impl Iterator<Item = (u8, NodePtr)> + '_ {
        (0..self.live()).map(move |i| (self.keys[i].load(), self.children[i].load()))
    }

    /// The one child that is not under `byte`; for the collapse path,
    /// under the write lock of a two-child node.
    pub(crate) fn other_child(&self, byte: u8) -> (u8, NodePtr) {
        debug_assert_eq!(self.live(), 2);
        for i in 0..2 {
            let k = self.keys[i].load();
            if k != byte {
                return (k, self.children[i].load());
            }
        }
        unreachable!("two-child node with no sibling for {}", byte)
    }

    pub(crate) fn find_child(&self, byte: u8) -> Option<NodePtr> {
        let count = self.live();
        if count == 0 {
            return None;
        }
        // All four key bytes in one word; zero-byte trick finds the
        // match without a branch per slot.
        let mut keys_word = 0u32;
        for (i, key) in self.keys.iter().enumerate() {
            keys_word |= (key.load() as u32) << (8 * i);
        }
        let diff = keys_word ^ 0x0101_0101u32.wrapping_mul(byte as u32);
        let mut found = diff.wrapping_sub(0x0101_0101) & !diff & 0x8080_8080;
        if count < 4 {
            found &= (1u32 << (8 * count)) - 1;
        }
        if found == 0 {
            return None;
        }
        let index = (found.trailing_zeros() / 8) as usize;
        let child = self.children[index].load();
        if child.is_null() {
            None
        } else {
            Some(child)
        }
    }

    pub(crate) fn add_to_nonfull(&self, byte: u8, child: NodePtr) {
        let count = self.live();
        debug_assert!(count < Self::CAPACITY as usize);
        let mut pos = count;
        for i in 0..count {
            debug_assert_ne!(self.keys[i].load(), byte);
            if self.keys[i].load() > byte {
                pos = i;
                break;
            }
        }
        let mut i = count;
        while i > pos {
            self.keys[i].store(self.keys[i - 1].load());
            self.children[i].store(self.children[i - 1].load());
            i -= 1;
        }
        self.keys[pos].store(byte);
        self.children[pos].store(child);
        self.header.count.store(count as u16 + 1);
    }

    pub(crate) fn remove_child(&self, byte: u8) {
        let count = self.live();
        for i in 0..count {
            if self.keys[i].load() == byte {
                for j in i..count - 1 {
                    self.keys[j].store(self.keys[j + 1].load());
                    self.children[j].store(self.children[j + 1].load());
                }
                self.children[count - 1].store(NodePtr::NULL);
                self.header.count.store(count as u16 - 1);
                return;
            }
        }
        unreachable!("removing absent child byte {}", byte)
    }

    pub(crate) fn set_child(&self, byte: u8, child: NodePtr) {
        let count = self.live();
        for i in 0..count {
            if self.keys[i].load() == byte {
                self.children[i].store(child);
                return;
            }
        }
        unreachable!("replacing absent child byte {}", byte)
    }

    pub(crate) fn gte_child(&self, byte: u8) -> Option<(u8, NodePtr)> {
        let count = self.live();
        for i in 0..count {
            let k = self.keys[i].load();
            if k >= byte {
                let child = self.children[i].load();
                return if child.is_null() { None } else { Some((k, child)) };
            }
        }
        None
    }

    pub(crate) fn lte_child(&self, byte: u8) -> Option<(u8, NodePtr)> {
        let count = self.live();
        for i in (0..count).rev() {
            let k = self.keys[i].load();
            if k <= byte {
                let child = self.children[i].load();
                return if child.is_null() { None } else { Some((k, child)) };
            }
        }
        None
    }
}
