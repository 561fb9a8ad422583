// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Internal node holding five to sixteen children.
//!
//! Same sorted parallel-array shape as `Node4`, with child lookup over a
//! full 16-byte lane: one SSE2 compare-and-movemask on x86-64, a scalar
//! scan elsewhere.

use crate::art::inode::NodeHeader;
use crate::art::node4::Node4;
use crate::art::node48::Node48;
use crate::art::ptr::NodePtr;
use crate::concurrent::cell::SharedCell;
use crate::concurrent::policy::TreePolicy;

pub(crate) struct Node16<P: TreePolicy> {
    pub(crate) header: NodeHeader<P>,
    keys: [P::Cell<u8>; 16],
    children: [P::Cell<NodePtr>; 16],
}

impl<P: TreePolicy> Node16<P> {
    pub(crate) const CAPACITY: u16 = 16;
    pub(crate) const MIN_SIZE: u16 = 5;

    fn empty_arrays() -> ([P::Cell<u8>; 16], [P::Cell<NodePtr>; 16]) {
        (
            std::array::from_fn(|_| P::Cell::new(0u8)),
            std::array::from_fn(|_| P::Cell::new(NodePtr::NULL)),
        )
    }

    /// Grow transition from a full `Node4` plus the entry that did not
    /// fit. Runs under the source node's write lock.
    pub(crate) fn grow_from(source: &Node4<P>, new_byte: u8, new_child: NodePtr) -> Box<Self> {
        let (keys, children) = Self::empty_arrays();
        let node = Box::new(Self {
            header: NodeHeader::with_prefix_snapshot(
                source.header.prefix.snapshot(),
                Node4::<P>::CAPACITY + 1,
            ),
            keys,
            children,
        });
        let mut out = 0usize;
        let mut inserted = false;
        for (byte, child) in source.entries() {
            if !inserted && new_byte < byte {
                node.keys[out].store(new_byte);
                node.children[out].store(new_child);
                out += 1;
                inserted = true;
            }
            node.keys[out].store(byte);
            node.children[out].store(child);
            out += 1;
        }
        if !inserted {
            node.keys[out].store(new_byte);
            node.children[out].store(new_child);
            out += 1;
        }
        debug_assert_eq!(out, Node4::<P>::CAPACITY as usize + 1);
        node
    }

    /// Shrink transition from a minimum-size `Node48`, skipping the
    /// child being removed. Runs under the source node's write lock.
    pub(crate) fn shrink_from(source: &Node48<P>, remove_byte: u8) -> Box<Self> {
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

    /// Key/child pairs in key order; reads must be stable.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (u8, NodePtr)> + '_ {
        (0..self.live()).map(move |i| (self.keys[i].load(), self.children[i].load()))
    }

    #[cfg(target_arch = "x86_64")]
    fn find_index(&self, byte: u8, count: usize) -> Option<usize> {
        // SSE2 is baseline on x86-64. The cell array is contiguous
        // byte storage, loaded unaligned into one lane.
        unsafe {
            use std::arch::x86_64::{
                __m128i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
            };
            let lane = _mm_loadu_si128(self.keys.as_ptr() as *const __m128i);
            let hits = _mm_cmpeq_epi8(lane, _mm_set1_epi8(byte as i8));
            let mask = (_mm_movemask_epi8(hits) as u32) & ((1u32 << count) - 1);
            if mask == 0 {
                None
            } else {
                Some(mask.trailing_zeros() as usize)
            }
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn find_index(&self, byte: u8, count: usize) -> Option<usize> {
        (0..count).find(|&i| self.keys[i].load() == byte)
    }

    pub(crate) fn find_child(&self, byte: u8) -> Option<NodePtr> {
        let count = self.live();
        if count == 0 {
            return None;
        }
        let index = self.find_index(byte, count)?;
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
        if let Some(index) = self.find_index(byte, count) {
            self.children[index].store(child);
            return;
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
