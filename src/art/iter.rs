// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Path-stack iterator and scan driver.
//!
//! The iterator keeps one frame per ancestor (node pointer, version
//! snapshot, and the key byte taken downwards) plus a buffer holding
//! the current leaf's full key. A step validates the frames it touches;
//! when a snapshot no longer holds, the path is rebuilt by seeking the
//! buffered key and the step resumes from there. Under the
//! single-threaded policy every validation passes and the stack walk is
//! the whole story.
//!
//! Scans are snapshot-consistent per node, not globally: entries
//! inserted or removed elsewhere in the tree during a scan may or may
//! not be observed.

use crate::art::inode::NodeRef;
use crate::art::ptr::NodePtr;
use crate::art::tree::{Attempt, RadixTree, Restart};
use crate::concurrent::cell::SharedCell;
use crate::concurrent::policy::TreePolicy;
use crate::concurrent::version::{Version, VersionLock};

#[cfg(debug_assertions)]
use crate::qsbr;

/// One ancestor on the current path.
struct Frame {
    node: NodePtr,
    version: Version,
    key_byte: u8,
}

/// Ordering of a seek key against a node's whole subtree, decided at
/// the node's prefix.
enum SubtreeOrd {
    /// The key matches the prefix; continue below.
    Within,
    /// Every key in the subtree is greater.
    KeyLess,
    /// Every key in the subtree is smaller.
    KeyGreater,
}

pub(crate) struct TreeIterator<'a, P: TreePolicy> {
    tree: &'a RadixTree<P>,
    stack: Vec<Frame>,
    leaf: NodePtr,
    key_buf: Vec<u8>,
}

impl<'a, P: TreePolicy> TreeIterator<'a, P> {
    fn invalid(tree: &'a RadixTree<P>) -> Self {
        Self {
            tree,
            stack: Vec::new(),
            leaf: NodePtr::NULL,
            key_buf: Vec::new(),
        }
    }

    /// Positions on the smallest key.
    pub(crate) fn first(tree: &'a RadixTree<P>) -> Self {
        loop {
            match Self::try_extremum(tree, true) {
                Ok(it) => return it,
                Err(Restart) => continue,
            }
        }
    }

    /// Positions on the largest key.
    pub(crate) fn last(tree: &'a RadixTree<P>) -> Self {
        loop {
            match Self::try_extremum(tree, false) {
                Ok(it) => return it,
                Err(Restart) => continue,
            }
        }
    }

    fn try_extremum(tree: &'a RadixTree<P>, min: bool) -> Attempt<Self> {
        let mut it = Self::invalid(tree);
        let root_ver = tree.root_lock.try_read_lock().ok_or(Restart)?;
        let root = tree.root.load();
        if !tree.root_lock.check(root_ver) {
            return Err(Restart);
        }
        if root.is_null() {
            return Ok(it);
        }
        if min {
            it.descend_min(root)?;
        } else {
            it.descend_max(root)?;
        }
        Ok(it)
    }

    pub(crate) fn is_valid(&self) -> bool {
        !self.leaf.is_null()
    }

    /// The current key; empty when invalid.
    pub(crate) fn key(&self) -> &[u8] {
        &self.key_buf
    }

    /// Calls the visitor with the current entry; returns its halt flag.
    pub(crate) fn visit<F: FnMut(&[u8], &[u8]) -> bool>(&self, visitor: &mut F) -> bool {
        debug_assert!(self.is_valid());
        let leaf = unsafe { self.leaf.leaf_ref() };
        visitor(&self.key_buf, leaf.value())
    }

    /// Every assignment of the current leaf goes through here so the
    /// debug active-pointer registry stays paired.
    fn set_current_leaf(&mut self, ptr: NodePtr) {
        #[cfg(debug_assertions)]
        if P::DEFERRED_RECLAIM {
            if !self.leaf.is_null() {
                qsbr::thread::deregister_active_pointer(self.leaf.to_bits());
            }
            if !ptr.is_null() {
                qsbr::thread::register_active_pointer(ptr.to_bits());
            }
        }
        self.leaf = ptr;
    }

    /// Walks to the smallest leaf under `node`, pushing frames.
    fn descend_min(&mut self, mut node: NodePtr) -> Attempt<()> {
        loop {
            if node.is_leaf() {
                return self.arrive_at_leaf(node);
            }
            let inode = unsafe { NodeRef::<P>::from_ptr(node) };
            let ver = inode.lock().try_read_lock().ok_or(Restart)?;
            let entry = inode.begin();
            if !inode.lock().check(ver) {
                return Err(Restart);
            }
            let Some((byte, child)) = entry else {
                return Err(Restart);
            };
            self.stack.push(Frame {
                node,
                version: ver,
                key_byte: byte,
            });
            node = child;
        }
    }

    /// Walks to the largest leaf under `node`, pushing frames.
    fn descend_max(&mut self, mut node: NodePtr) -> Attempt<()> {
        loop {
            if node.is_leaf() {
                return self.arrive_at_leaf(node);
            }
            let inode = unsafe { NodeRef::<P>::from_ptr(node) };
            let ver = inode.lock().try_read_lock().ok_or(Restart)?;
            let entry = inode.last();
            if !inode.lock().check(ver) {
                return Err(Restart);
            }
            let Some((byte, child)) = entry else {
                return Err(Restart);
            };
            self.stack.push(Frame {
                node,
                version: ver,
                key_byte: byte,
            });
            node = child;
        }
    }

    fn arrive_at_leaf(&mut self, leaf_ptr: NodePtr) -> Attempt<()> {
        let leaf = unsafe { leaf_ptr.leaf_ref() };
        if let Some(top) = self.stack.last() {
            let parent = unsafe { NodeRef::<P>::from_ptr(top.node) };
            if !parent.lock().check(top.version) {
                return Err(Restart);
            }
        }
        self.key_buf.clear();
        self.key_buf.extend_from_slice(leaf.key());
        self.set_current_leaf(leaf_ptr);
        Ok(())
    }

    /// Advances to the next key. `false` when exhausted.
    pub(crate) fn step_next(&mut self) -> bool {
        self.step(true)
    }

    /// Moves to the previous key. `false` when exhausted.
    pub(crate) fn step_prior(&mut self) -> bool {
        self.step(false)
    }

    fn step(&mut self, fwd: bool) -> bool {
        loop {
            if !self.is_valid() {
                return false;
            }
            let attempt = if fwd {
                self.try_advance_next()
            } else {
                self.try_advance_prior()
            };
            match attempt {
                Ok(valid) => return valid,
                Err(Restart) => {
                    // A snapshot went stale: rebuild the path from the
                    // buffered key and resume.
                    let target = std::mem::take(&mut self.key_buf);
                    let (fresh, matched) = Self::seek(self.tree, &target, fwd);
                    *self = fresh;
                    if !self.is_valid() {
                        return false;
                    }
                    if !matched {
                        // The seek already landed past the target.
                        return true;
                    }
                }
            }
        }
    }

    fn try_advance_next(&mut self) -> Attempt<bool> {
        while let Some(top) = self.stack.last_mut() {
            let inode = unsafe { NodeRef::<P>::from_ptr(top.node) };
            let entry = inode.next_child(top.key_byte);
            if !inode.lock().check(top.version) {
                return Err(Restart);
            }
            match entry {
                Some((byte, child)) => {
                    top.key_byte = byte;
                    self.descend_min(child)?;
                    return Ok(true);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        self.set_current_leaf(NodePtr::NULL);
        Ok(false)
    }

    fn try_advance_prior(&mut self) -> Attempt<bool> {
        while let Some(top) = self.stack.last_mut() {
            let inode = unsafe { NodeRef::<P>::from_ptr(top.node) };
            let entry = inode.prior_child(top.key_byte);
            if !inode.lock().check(top.version) {
                return Err(Restart);
            }
            match entry {
                Some((byte, child)) => {
                    top.key_byte = byte;
                    self.descend_max(child)?;
                    return Ok(true);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        self.set_current_leaf(NodePtr::NULL);
        Ok(false)
    }

    /// Positions at `key`: on the exact entry when present (`true`), on
    /// the next entry `>= key` (forward) or `<= key` (reverse)
    /// otherwise. Invalid when no such entry exists.
    pub(crate) fn seek(tree: &'a RadixTree<P>, key: &[u8], fwd: bool) -> (Self, bool) {
        loop {
            match Self::try_seek(tree, key, fwd) {
                Ok(result) => return result,
                Err(Restart) => continue,
            }
        }
    }

    fn try_seek(tree: &'a RadixTree<P>, key: &[u8], fwd: bool) -> Attempt<(Self, bool)> {
        let mut it = Self::invalid(tree);
        let root_ver = tree.root_lock.try_read_lock().ok_or(Restart)?;
        let mut node = tree.root.load();
        if !tree.root_lock.check(root_ver) {
            return Err(Restart);
        }
        if node.is_null() {
            return Ok((it, false));
        }
        let mut parent_lock: &P::Lock = &tree.root_lock;
        let mut parent_ver = root_ver;
        let mut depth = 0usize;
        loop {
            if node.is_leaf() {
                let leaf = unsafe { node.leaf_ref() };
                if !parent_lock.check(parent_ver) {
                    return Err(Restart);
                }
                return match leaf.key().cmp(key) {
                    std::cmp::Ordering::Equal => {
                        it.arrive_at_leaf(node)?;
                        Ok((it, true))
                    }
                    std::cmp::Ordering::Greater => {
                        it.arrive_at_leaf(node)?;
                        if !fwd {
                            it.try_advance_prior()?;
                        }
                        Ok((it, false))
                    }
                    std::cmp::Ordering::Less => {
                        it.arrive_at_leaf(node)?;
                        if fwd {
                            it.try_advance_next()?;
                        }
                        Ok((it, false))
                    }
                };
            }
            let inode = unsafe { NodeRef::<P>::from_ptr(node) };
            let ver = inode.lock().try_read_lock().ok_or(Restart)?;
            if !parent_lock.check(parent_ver) {
                return Err(Restart);
            }
            let (ord, prefix_total) = Self::classify_subtree(tree, inode, ver, key, depth)?;
            if !inode.lock().check(ver) {
                return Err(Restart);
            }
            match ord {
                SubtreeOrd::KeyLess => {
                    // Everything below is greater than the key.
                    it.descend_min(node)?;
                    if !fwd {
                        it.try_advance_prior()?;
                    }
                    return Ok((it, false));
                }
                SubtreeOrd::KeyGreater => {
                    // Everything below is smaller than the key.
                    it.descend_max(node)?;
                    if fwd {
                        it.try_advance_next()?;
                    }
                    return Ok((it, false));
                }
                SubtreeOrd::Within => {}
            }
            depth += prefix_total;
            if depth >= key.len() {
                // The key ends at this node; all entries below extend it.
                it.descend_min(node)?;
                if !fwd {
                    it.try_advance_prior()?;
                }
                return Ok((it, false));
            }
            let key_byte = key[depth];
            let child = inode.find_child(key_byte);
            if !inode.lock().check(ver) {
                return Err(Restart);
            }
            if let Some(child) = child {
                it.stack.push(Frame {
                    node,
                    version: ver,
                    key_byte,
                });
                parent_lock = inode.lock();
                parent_ver = ver;
                node = child;
                depth += 1;
                continue;
            }
            // No exact child: branch to the adjacent populated byte.
            if fwd {
                let entry = inode.gte_child(key_byte);
                if !inode.lock().check(ver) {
                    return Err(Restart);
                }
                match entry {
                    Some((byte, child)) => {
                        it.stack.push(Frame {
                            node,
                            version: ver,
                            key_byte: byte,
                        });
                        it.descend_min(child)?;
                        return Ok((it, false));
                    }
                    None => {
                        // All children sort before the key byte.
                        it.descend_max(node)?;
                        it.try_advance_next()?;
                        return Ok((it, false));
                    }
                }
            } else {
                let entry = inode.lte_child(key_byte);
                if !inode.lock().check(ver) {
                    return Err(Restart);
                }
                match entry {
                    Some((byte, child)) => {
                        it.stack.push(Frame {
                            node,
                            version: ver,
                            key_byte: byte,
                        });
                        it.descend_max(child)?;
                        return Ok((it, false));
                    }
                    None => {
                        // All children sort after the key byte.
                        it.descend_min(node)?;
                        it.try_advance_prior()?;
                        return Ok((it, false));
                    }
                }
            }
        }
    }

    /// Decides how the key relates to the subtree at this node's
    /// prefix; also returns the prefix length consumed on a match.
    fn classify_subtree(
        tree: &RadixTree<P>,
        inode: NodeRef<'_, P>,
        ver: Version,
        key: &[u8],
        depth: usize,
    ) -> Attempt<(SubtreeOrd, usize)> {
        let snap = inode.prefix();
        let total = snap.total_len();
        if total == 0 {
            return Ok((SubtreeOrd::Within, 0));
        }
        let rem = &key[depth..];
        if snap.is_fully_stored() {
            let shared = snap.shared_with_stored(rem);
            if shared == total.min(rem.len()) {
                // A key that ends inside the prefix sorts before every
                // longer key sharing it.
                let ord = if rem.len() >= total {
                    SubtreeOrd::Within
                } else {
                    SubtreeOrd::KeyLess
                };
                return Ok((ord, total));
            }
            let ord = if rem[shared] < snap.byte(shared) {
                SubtreeOrd::KeyLess
            } else {
                SubtreeOrd::KeyGreater
            };
            return Ok((ord, total));
        }
        // Long prefix: try the stored window, then the hidden bytes.
        let window_shared = snap.shared_with_stored(rem);
        let window_limit = snap.stored_len().min(rem.len());
        if window_shared < window_limit {
            let ord = if rem[window_shared] < snap.byte(window_shared) {
                SubtreeOrd::KeyLess
            } else {
                SubtreeOrd::KeyGreater
            };
            return Ok((ord, total));
        }
        if rem.len() <= snap.stored_len() {
            return Ok((SubtreeOrd::KeyLess, total));
        }
        let bytes = tree.resolve_prefix(inode, ver, depth, total)?;
        let limit = total.min(rem.len());
        let mut shared = 0usize;
        while shared < limit && bytes[shared] == rem[shared] {
            shared += 1;
        }
        if shared == limit {
            let ord = if rem.len() >= total {
                SubtreeOrd::Within
            } else {
                SubtreeOrd::KeyLess
            };
            return Ok((ord, total));
        }
        let ord = if rem[shared] < bytes[shared] {
            SubtreeOrd::KeyLess
        } else {
            SubtreeOrd::KeyGreater
        };
        Ok((ord, total))
    }
}

impl<P: TreePolicy> Drop for TreeIterator<'_, P> {
    fn drop(&mut self) {
        self.set_current_leaf(NodePtr::NULL);
    }
}

// scan driver

impl<P: TreePolicy> RadixTree<P> {
    /// Visits every entry in key order (`fwd`) or reverse; the visitor
    /// returning `true` halts the scan.
    pub(crate) fn scan<F: FnMut(&[u8], &[u8]) -> bool>(&self, fwd: bool, mut visitor: F) {
        let mut it = if fwd {
            TreeIterator::first(self)
        } else {
            TreeIterator::last(self)
        };
        while it.is_valid() {
            if it.visit(&mut visitor) {
                return;
            }
            let more = if fwd { it.step_next() } else { it.step_prior() };
            if !more {
                return;
            }
        }
    }

    /// Scans from `key` (or its successor/predecessor when absent) in
    /// the given direction.
    pub(crate) fn scan_from<F: FnMut(&[u8], &[u8]) -> bool>(
        &self,
        key: &[u8],
        fwd: bool,
        mut visitor: F,
    ) {
        let (mut it, _) = TreeIterator::seek(self, key, fwd);
        while it.is_valid() {
            if it.visit(&mut visitor) {
                return;
            }
            let more = if fwd { it.step_next() } else { it.step_prior() };
            if !more {
                return;
            }
        }
    }

    /// Scans `[from, to)` ascending when `from < to`, or `(to, from]`
    /// descending when `from > to`. Empty when `from == to`.
    pub(crate) fn scan_range<F: FnMut(&[u8], &[u8]) -> bool>(
        &self,
        from: &[u8],
        to: &[u8],
        mut visitor: F,
    ) {
        if from == to {
            return;
        }
        let fwd = from < to;
        let (mut it, _) = TreeIterator::seek(self, from, fwd);
        while it.is_valid() {
            if fwd {
                if it.key() >= to {
                    return;
                }
            } else if it.key() <= to {
                return;
            }
            if it.visit(&mut visitor) {
                return;
            }
            let more = if fwd { it.step_next() } else { it.step_prior() };
            if !more {
                return;
            }
        }
    }
}
