// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tagged node pointer.
//!
//! One machine word addressing any tree node: the low three bits hold the
//! node kind, the rest the allocation address. Node allocations are
//! 8-byte aligned, so the tag never collides with address bits. The null
//! pointer is the all-zero word.
//!
//! Every `unsafe` pointer cast in the crate lives in this module; the
//! tree algorithms go through the typed accessors below.

use crate::art::leaf::Leaf;
use crate::art::node16::Node16;
use crate::art::node256::Node256;
use crate::art::node4::Node4;
use crate::art::node48::Node48;
use crate::concurrent::cell::CellValue;
use crate::concurrent::policy::TreePolicy;
use std::sync::atomic::{AtomicUsize, Ordering};

const TAG_BITS: usize = 3;
const TAG_MASK: usize = (1 << TAG_BITS) - 1;

/// Node kind encoded in the pointer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Leaf = 0,
    N4 = 1,
    N16 = 2,
    N48 = 3,
    N256 = 4,
}

/// Tagged pointer to a tree node. Copy, word-sized, possibly null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodePtr(usize);

impl NodePtr {
    pub(crate) const NULL: NodePtr = NodePtr(0);

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub(crate) fn is_leaf(self) -> bool {
        !self.is_null() && self.0 & TAG_MASK == NodeKind::Leaf as usize
    }

    #[inline]
    pub(crate) fn kind(self) -> NodeKind {
        debug_assert!(!self.is_null());
        match self.0 & TAG_MASK {
            0 => NodeKind::Leaf,
            1 => NodeKind::N4,
            2 => NodeKind::N16,
            3 => NodeKind::N48,
            4 => NodeKind::N256,
            _ => unreachable!("invalid node tag"),
        }
    }

    #[inline]
    fn addr(self) -> usize {
        self.0 & !TAG_MASK
    }

    #[inline]
    pub(crate) fn to_bits(self) -> usize {
        self.0
    }

    #[inline]
    pub(crate) fn from_bits(bits: usize) -> Self {
        NodePtr(bits)
    }

    fn tag(addr: usize, kind: NodeKind) -> Self {
        debug_assert_eq!(addr & TAG_MASK, 0, "node allocation under-aligned");
        NodePtr(addr | kind as usize)
    }

    pub(crate) fn from_leaf(leaf: Box<Leaf>) -> Self {
        Self::tag(Box::into_raw(leaf) as usize, NodeKind::Leaf)
    }

    pub(crate) fn from_n4<P: TreePolicy>(node: Box<Node4<P>>) -> Self {
        Self::tag(Box::into_raw(node) as usize, NodeKind::N4)
    }

    pub(crate) fn from_n16<P: TreePolicy>(node: Box<Node16<P>>) -> Self {
        Self::tag(Box::into_raw(node) as usize, NodeKind::N16)
    }

    pub(crate) fn from_n48<P: TreePolicy>(node: Box<Node48<P>>) -> Self {
        Self::tag(Box::into_raw(node) as usize, NodeKind::N48)
    }

    pub(crate) fn from_n256<P: TreePolicy>(node: Box<Node256<P>>) -> Self {
        Self::tag(Box::into_raw(node) as usize, NodeKind::N256)
    }

    /// # Safety
    ///
    /// The pointer must address a live leaf. Under the concurrent policy
    /// the caller must be inside a QSBR-protected window, so a leaf
    /// unlinked concurrently is retired but not yet freed.
    #[inline]
    pub(crate) unsafe fn leaf_ref<'a>(self) -> &'a Leaf {
        debug_assert!(self.is_leaf());
        &*(self.addr() as *const Leaf)
    }

    /// # Safety
    ///
    /// The pointer must address a live `Node4<P>` allocated by the same
    /// policy instantiation.
    #[inline]
    pub(crate) unsafe fn n4_ref<'a, P: TreePolicy>(self) -> &'a Node4<P> {
        debug_assert_eq!(self.kind(), NodeKind::N4);
        &*(self.addr() as *const Node4<P>)
    }

    /// # Safety
    ///
    /// As [`n4_ref`](Self::n4_ref), for `Node16`.
    #[inline]
    pub(crate) unsafe fn n16_ref<'a, P: TreePolicy>(self) -> &'a Node16<P> {
        debug_assert_eq!(self.kind(), NodeKind::N16);
        &*(self.addr() as *const Node16<P>)
    }

    /// # Safety
    ///
    /// As [`n4_ref`](Self::n4_ref), for `Node48`.
    #[inline]
    pub(crate) unsafe fn n48_ref<'a, P: TreePolicy>(self) -> &'a Node48<P> {
        debug_assert_eq!(self.kind(), NodeKind::N48);
        &*(self.addr() as *const Node48<P>)
    }

    /// # Safety
    ///
    /// As [`n4_ref`](Self::n4_ref), for `Node256`.
    #[inline]
    pub(crate) unsafe fn n256_ref<'a, P: TreePolicy>(self) -> &'a Node256<P> {
        debug_assert_eq!(self.kind(), NodeKind::N256);
        &*(self.addr() as *const Node256<P>)
    }

    /// Heap bytes of this node allocation, for the resident-byte stats.
    pub(crate) fn allocated_bytes<P: TreePolicy>(self) -> usize {
        match self.kind() {
            NodeKind::Leaf => unsafe { self.leaf_ref().allocated_bytes() },
            NodeKind::N4 => std::mem::size_of::<Node4<P>>(),
            NodeKind::N16 => std::mem::size_of::<Node16<P>>(),
            NodeKind::N48 => std::mem::size_of::<Node48<P>>(),
            NodeKind::N256 => std::mem::size_of::<Node256<P>>(),
        }
    }

    /// Frees this node allocation only; children are not touched.
    ///
    /// # Safety
    ///
    /// The pointer must be live, allocated by this policy instantiation,
    /// and unreachable by every other thread.
    pub(crate) unsafe fn drop_allocation<P: TreePolicy>(self) {
        match self.kind() {
            NodeKind::Leaf => drop(Box::from_raw(self.addr() as *mut Leaf)),
            NodeKind::N4 => drop(Box::from_raw(self.addr() as *mut Node4<P>)),
            NodeKind::N16 => drop(Box::from_raw(self.addr() as *mut Node16<P>)),
            NodeKind::N48 => drop(Box::from_raw(self.addr() as *mut Node48<P>)),
            NodeKind::N256 => drop(Box::from_raw(self.addr() as *mut Node256<P>)),
        }
    }
}

/// Deferred-free entry point handed to QSBR, monomorphised per policy.
///
/// # Safety
///
/// `bits` must come from `NodePtr::to_bits` of a node retired under the
/// same policy, and no thread may still hold the pointer.
pub(crate) unsafe fn drop_node_bits<P: TreePolicy>(bits: usize) {
    NodePtr::from_bits(bits).drop_allocation::<P>()
}

impl CellValue for NodePtr {
    type Atomic = AtomicUsize;

    #[inline]
    fn atomic_new(v: Self) -> Self::Atomic {
        AtomicUsize::new(v.0)
    }

    #[inline]
    fn atomic_load(a: &Self::Atomic) -> Self {
        NodePtr(a.load(Ordering::Relaxed))
    }

    #[inline]
    fn atomic_store(a: &Self::Atomic, v: Self) {
        a.store(v.0, Ordering::Relaxed)
    }
}
