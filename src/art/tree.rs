// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tree algorithms: find, insert, remove.
//!
//! Written once over the policy parameter. Under the concurrent policy
//! every step follows the optimistic protocol (read-lock the node,
//! validate the parent, act, validate again) and conflicts surface as
//! an internal restart that re-runs the operation from the root. Under
//! the single-threaded policy the same code compiles against the fake
//! lock and every validation folds to `true`.
//!
//! ## Locking shapes
//!
//! - Plain child add/remove: write lock on the node alone, after a final
//!   read validation of the parent.
//! - Grow, shrink, prefix split: write locks on parent and node; the
//!   replaced node is released as obsolete.
//! - One-child collapse: write locks on parent, node and the surviving
//!   child (whose prefix is rewritten).
//!
//! A new node is always fully initialised before the pointer to it is
//! published under the parent's write guard; the parent's release
//! unlock orders those stores before any reader that can observe the
//! link.

use crate::art::inode::NodeRef;
use crate::art::leaf::Leaf;
use crate::art::node16::Node16;
use crate::art::node256::Node256;
use crate::art::node4::Node4;
use crate::art::node48::Node48;
use crate::art::prefix::{PrefixSnapshot, PREFIX_CAPACITY};
use crate::art::ptr::{drop_node_bits, NodePtr};
use crate::art::stats::{TreeCounters, TreeStats};
use crate::concurrent::cell::SharedCell;
use crate::concurrent::policy::TreePolicy;
use crate::concurrent::version::{Version, VersionLock, WriteGuard};
use crate::error::{ReedError, ReedResult};
use crate::qsbr;
use crate::qsbr::DeferredRequest;

/// Internal optimistic-conflict signal; operations retry until they
/// complete, it is never surfaced.
pub(crate) struct Restart;

pub(crate) type Attempt<T> = Result<T, Restart>;

/// The shared tree core behind all three index variants.
pub(crate) struct RadixTree<P: TreePolicy> {
    pub(crate) root_lock: P::Lock,
    pub(crate) root: P::Cell<NodePtr>,
    pub(crate) counters: TreeCounters,
}

/// Effective prefix bytes recovered for a structural change. Short
/// prefixes come from the stored window without allocating.
enum PrefixBytes {
    Inline([u8; PREFIX_CAPACITY], usize),
    Heap(Vec<u8>),
}

impl std::ops::Deref for PrefixBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            PrefixBytes::Inline(bytes, len) => &bytes[..*len],
            PrefixBytes::Heap(v) => v,
        }
    }
}

/// Outcome of matching a key tail against a node's prefix.
enum PrefixMatch {
    /// The whole prefix matched; consume `skip` bytes.
    Full { skip: usize },
    /// Divergence at `shared`; `bytes` holds the effective prefix.
    Mismatch { shared: usize, bytes: PrefixBytes },
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    let limit = a.len().min(b.len());
    let mut i = 0;
    while i < limit && a[i] == b[i] {
        i += 1;
    }
    i
}

impl<P: TreePolicy> RadixTree<P> {
    pub(crate) fn new() -> Self {
        Self {
            root_lock: P::Lock::default(),
            root: P::Cell::new(NodePtr::NULL),
            counters: TreeCounters::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.counters.leaf_count() as usize
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn stats(&self) -> TreeStats {
        self.counters.snapshot()
    }

    fn register_new(&self, ptr: NodePtr) {
        self.counters
            .node_created(ptr.kind(), ptr.allocated_bytes::<P>());
    }

    /// Unlinks a node's allocation: immediate free under exclusive
    /// access, deferred through QSBR under the concurrent policy.
    fn retire(&self, ptr: NodePtr) {
        let bytes = ptr.allocated_bytes::<P>();
        self.counters.node_dropped(ptr.kind(), bytes);
        if P::DEFERRED_RECLAIM {
            qsbr::thread::defer_free(DeferredRequest::new(
                ptr.to_bits(),
                drop_node_bits::<P>,
                bytes,
            ));
        } else {
            unsafe { ptr.drop_allocation::<P>() };
        }
    }

    fn write_parent_slot(&self, parent: Option<NodeRef<'_, P>>, byte: u8, child: NodePtr) {
        match parent {
            None => self.root.store(child),
            Some(node) => node.set_child(byte, child),
        }
    }

    // point lookup

    /// Runs `f` over the value of `key`, or returns `None` when absent.
    pub(crate) fn get_with<R, F: FnOnce(&[u8]) -> R>(&self, key: &[u8], f: F) -> Option<R> {
        let mut f = Some(f);
        loop {
            match self.try_get(key, &mut f) {
                Ok(result) => return result,
                Err(Restart) => continue,
            }
        }
    }

    pub(crate) fn contains(&self, key: &[u8]) -> bool {
        self.get_with(key, |_| ()).is_some()
    }

    /// Borrows the value for `key` for the caller's lifetime.
    ///
    /// Only sound under exclusive access: leaves stay allocated until
    /// the next mutation through `&mut self`. The concurrent index
    /// copies values out instead of calling this.
    pub(crate) fn get_ref(&self, key: &[u8]) -> Option<&[u8]> {
        self.get_with(key, |v| unsafe { &*(v as *const [u8]) })
    }

    fn try_get<R, F: FnOnce(&[u8]) -> R>(
        &self,
        key: &[u8],
        f: &mut Option<F>,
    ) -> Attempt<Option<R>> {
        let root_ver = self.root_lock.try_read_lock().ok_or(Restart)?;
        let mut node = self.root.load();
        if !self.root_lock.check(root_ver) {
            return Err(Restart);
        }
        if node.is_null() {
            return Ok(None);
        }
        let mut parent_lock: &P::Lock = &self.root_lock;
        let mut parent_ver = root_ver;
        let mut depth = 0usize;
        loop {
            if node.is_leaf() {
                let leaf = unsafe { node.leaf_ref() };
                if !parent_lock.try_read_unlock(parent_ver) {
                    return Err(Restart);
                }
                if leaf.key() == key {
                    let f = f.take().expect("visitor consumed twice");
                    return Ok(Some(f(leaf.value())));
                }
                return Ok(None);
            }
            let inode = unsafe { NodeRef::<P>::from_ptr(node) };
            let ver = inode.lock().try_read_lock().ok_or(Restart)?;
            if !parent_lock.check(parent_ver) {
                return Err(Restart);
            }
            let snap = inode.prefix();
            let rem = &key[depth..];
            let shared = snap.shared_with_stored(rem);
            if shared < snap.stored_len().min(rem.len()) || rem.len() < snap.total_len() {
                if !inode.lock().check(ver) {
                    return Err(Restart);
                }
                return Ok(None);
            }
            // A prefix longer than the stored window is skipped
            // optimistically; the leaf comparison verifies it.
            depth += snap.total_len();
            if depth >= key.len() {
                if !inode.lock().check(ver) {
                    return Err(Restart);
                }
                return Ok(None);
            }
            let child = inode.find_child(key[depth]);
            if !inode.lock().check(ver) {
                return Err(Restart);
            }
            let Some(child) = child else {
                return Ok(None);
            };
            parent_lock = inode.lock();
            parent_ver = ver;
            node = child;
            depth += 1;
        }
    }

    // insert

    /// Inserts a new entry. `Ok(false)` reports a duplicate key with the
    /// tree unchanged.
    pub(crate) fn insert(&self, key: &[u8], value: &[u8]) -> ReedResult<bool> {
        if key.is_empty() {
            return Err(ReedError::KeyEmpty);
        }
        if key.len() > u32::MAX as usize {
            return Err(ReedError::KeyTooLong { len: key.len() });
        }
        if value.len() > u32::MAX as usize {
            return Err(ReedError::ValueTooLong { len: value.len() });
        }
        let mut new_leaf = Some(Leaf::new(key, value));
        loop {
            match self.try_insert(key, &mut new_leaf) {
                Ok(inserted) => return Ok(inserted),
                Err(Restart) => continue,
            }
        }
    }

    fn try_insert(&self, key: &[u8], new_leaf: &mut Option<Box<Leaf>>) -> Attempt<bool> {
        let root_ver = self.root_lock.try_read_lock().ok_or(Restart)?;
        let root_ptr = self.root.load();
        if root_ptr.is_null() {
            let guard = WriteGuard::try_from(&self.root_lock, root_ver).ok_or(Restart)?;
            let leaf_ptr = NodePtr::from_leaf(new_leaf.take().expect("leaf reused"));
            self.register_new(leaf_ptr);
            self.root.store(leaf_ptr);
            guard.unlock();
            return Ok(true);
        }
        let mut parent_lock: &P::Lock = &self.root_lock;
        let mut parent_ver = root_ver;
        let mut parent_node: Option<NodeRef<'_, P>> = None;
        let mut parent_byte = 0u8;
        let mut node = root_ptr;
        let mut depth = 0usize;
        loop {
            if node.is_leaf() {
                return self.insert_split_leaf(
                    key, new_leaf, node, depth, parent_lock, parent_ver, parent_node, parent_byte,
                );
            }
            let inode = unsafe { NodeRef::<P>::from_ptr(node) };
            let ver = inode.lock().try_read_lock().ok_or(Restart)?;
            if !parent_lock.check(parent_ver) {
                return Err(Restart);
            }
            let snap = inode.prefix();
            match self.match_prefix(inode, ver, snap, key, depth)? {
                PrefixMatch::Mismatch { shared, bytes } => {
                    return self.insert_split_prefix(
                        key,
                        new_leaf,
                        node,
                        inode,
                        ver,
                        snap,
                        shared,
                        &bytes,
                        depth,
                        parent_lock,
                        parent_ver,
                        parent_node,
                        parent_byte,
                    );
                }
                PrefixMatch::Full { skip } => {
                    depth += skip;
                }
            }
            // Binary-comparable keys are prefix-free, so a key byte
            // remains whenever the node is internal.
            debug_assert!(depth < key.len(), "key is a proper prefix of another");
            let key_byte = key[depth];
            let child = inode.find_child(key_byte);
            if !inode.lock().check(ver) {
                return Err(Restart);
            }
            match child {
                Some(child) => {
                    parent_lock = inode.lock();
                    parent_ver = ver;
                    parent_node = Some(inode);
                    parent_byte = key_byte;
                    node = child;
                    depth += 1;
                }
                None => {
                    return self.insert_add_child(
                        key_byte,
                        new_leaf,
                        node,
                        inode,
                        ver,
                        parent_lock,
                        parent_ver,
                        parent_node,
                        parent_byte,
                    );
                }
            }
        }
    }

    /// Replaces a leaf with a two-child node holding it and the new key.
    #[allow(clippy::too_many_arguments)]
    fn insert_split_leaf(
        &self,
        key: &[u8],
        new_leaf: &mut Option<Box<Leaf>>,
        existing: NodePtr,
        depth: usize,
        parent_lock: &P::Lock,
        parent_ver: Version,
        parent_node: Option<NodeRef<'_, P>>,
        parent_byte: u8,
    ) -> Attempt<bool> {
        let leaf = unsafe { existing.leaf_ref() };
        if !parent_lock.check(parent_ver) {
            return Err(Restart);
        }
        let existing_key = leaf.key();
        if existing_key == key {
            return Ok(false);
        }
        let shared = common_prefix_len(&existing_key[depth..], &key[depth..]);
        debug_assert!(
            depth + shared < key.len() && depth + shared < existing_key.len(),
            "key is a proper prefix of another"
        );
        let guard = WriteGuard::try_from(parent_lock, parent_ver).ok_or(Restart)?;
        let leaf_ptr = NodePtr::from_leaf(new_leaf.take().expect("leaf reused"));
        self.register_new(leaf_ptr);
        let node4 = Node4::<P>::new_with_two(
            &key[depth..depth + shared],
            shared,
            existing_key[depth + shared],
            existing,
            key[depth + shared],
            leaf_ptr,
        );
        let node4_ptr = NodePtr::from_n4(node4);
        self.register_new(node4_ptr);
        self.write_parent_slot(parent_node, parent_byte, node4_ptr);
        guard.unlock();
        Ok(true)
    }

    /// Splits a node's prefix at the diverging byte, interposing a new
    /// two-child node above it.
    #[allow(clippy::too_many_arguments)]
    fn insert_split_prefix(
        &self,
        key: &[u8],
        new_leaf: &mut Option<Box<Leaf>>,
        node: NodePtr,
        inode: NodeRef<'_, P>,
        ver: Version,
        snap: PrefixSnapshot,
        shared: usize,
        prefix_bytes: &[u8],
        depth: usize,
        parent_lock: &P::Lock,
        parent_ver: Version,
        parent_node: Option<NodeRef<'_, P>>,
        parent_byte: u8,
    ) -> Attempt<bool> {
        debug_assert!(shared < snap.total_len());
        debug_assert!(
            depth + shared < key.len(),
            "key is a proper prefix of another"
        );
        let parent_guard = WriteGuard::try_from(parent_lock, parent_ver).ok_or(Restart)?;
        let node_guard = WriteGuard::try_from(inode.lock(), ver).ok_or(Restart)?;

        let old_prefix_byte = prefix_bytes[shared];
        let new_key_byte = key[depth + shared];
        let leaf_ptr = NodePtr::from_leaf(new_leaf.take().expect("leaf reused"));
        self.register_new(leaf_ptr);
        let upper = Node4::<P>::new_with_two(
            &prefix_bytes[..shared],
            shared,
            old_prefix_byte,
            node,
            new_key_byte,
            leaf_ptr,
        );
        let upper_ptr = NodePtr::from_n4(upper);
        self.register_new(upper_ptr);

        // The old node keeps the tail of its prefix past the split byte.
        if snap.is_fully_stored() {
            inode.header().prefix.cut(shared + 1);
        } else {
            let remaining_total = snap.total_len() - shared - 1;
            let window_end = prefix_bytes
                .len()
                .min(shared + 1 + remaining_total.min(PREFIX_CAPACITY));
            inode
                .header()
                .prefix
                .assign(&prefix_bytes[shared + 1..window_end], remaining_total);
        }

        self.write_parent_slot(parent_node, parent_byte, upper_ptr);
        self.counters.prefix_split();
        node_guard.unlock();
        parent_guard.unlock();
        Ok(true)
    }

    /// Adds the new leaf under `key_byte`, growing the node kind first
    /// when it is at capacity.
    #[allow(clippy::too_many_arguments)]
    fn insert_add_child(
        &self,
        key_byte: u8,
        new_leaf: &mut Option<Box<Leaf>>,
        node: NodePtr,
        inode: NodeRef<'_, P>,
        ver: Version,
        parent_lock: &P::Lock,
        parent_ver: Version,
        parent_node: Option<NodeRef<'_, P>>,
        parent_byte: u8,
    ) -> Attempt<bool> {
        if inode.is_full() {
            let parent_guard = WriteGuard::try_from(parent_lock, parent_ver).ok_or(Restart)?;
            let node_guard = WriteGuard::try_from(inode.lock(), ver).ok_or(Restart)?;
            let leaf_ptr = NodePtr::from_leaf(new_leaf.take().expect("leaf reused"));
            self.register_new(leaf_ptr);
            let bigger = match inode {
                NodeRef::N4(n) => NodePtr::from_n16(Node16::grow_from(n, key_byte, leaf_ptr)),
                NodeRef::N16(n) => NodePtr::from_n48(Node48::grow_from(n, key_byte, leaf_ptr)),
                NodeRef::N48(n) => NodePtr::from_n256(Node256::grow_from(n, key_byte, leaf_ptr)),
                NodeRef::N256(_) => unreachable!("direct-indexed node reported full on a miss"),
            };
            self.register_new(bigger);
            self.counters.grew();
            self.write_parent_slot(parent_node, parent_byte, bigger);
            node_guard.unlock_and_obsolete();
            self.retire(node);
            parent_guard.unlock();
            return Ok(true);
        }
        // Done with the parent; the node alone is modified.
        if !parent_lock.try_read_unlock(parent_ver) {
            return Err(Restart);
        }
        let node_guard = WriteGuard::try_from(inode.lock(), ver).ok_or(Restart)?;
        let leaf_ptr = NodePtr::from_leaf(new_leaf.take().expect("leaf reused"));
        self.register_new(leaf_ptr);
        inode.add_to_nonfull(key_byte, leaf_ptr);
        node_guard.unlock();
        Ok(true)
    }

    /// Matches the key tail against a node's prefix, recovering hidden
    /// bytes from the minimum leaf when the prefix outgrows its window.
    fn match_prefix(
        &self,
        inode: NodeRef<'_, P>,
        ver: Version,
        snap: PrefixSnapshot,
        key: &[u8],
        depth: usize,
    ) -> Attempt<PrefixMatch> {
        let rem = &key[depth..];
        let total = snap.total_len();
        if total == 0 {
            return Ok(PrefixMatch::Full { skip: 0 });
        }
        if snap.is_fully_stored() {
            let shared = snap.shared_with_stored(rem);
            if shared == total {
                return Ok(PrefixMatch::Full { skip: total });
            }
            debug_assert!(shared < rem.len(), "key is a proper prefix of another");
            let (bytes, len) = snap.stored_bytes();
            return Ok(PrefixMatch::Mismatch {
                shared,
                bytes: PrefixBytes::Inline(bytes, len),
            });
        }
        // Long prefix: recover the effective bytes below this node.
        let bytes = self.resolve_prefix(inode, ver, depth, total)?;
        let shared = common_prefix_len(&bytes, rem);
        if shared == total {
            Ok(PrefixMatch::Full { skip: total })
        } else {
            debug_assert!(shared < rem.len(), "key is a proper prefix of another");
            Ok(PrefixMatch::Mismatch {
                shared,
                bytes: PrefixBytes::Heap(bytes),
            })
        }
    }

    /// Reads the `total` effective prefix bytes of `inode` from the key
    /// of its minimum leaf, validating every link on the way down.
    pub(crate) fn resolve_prefix(
        &self,
        inode: NodeRef<'_, P>,
        ver: Version,
        depth: usize,
        total: usize,
    ) -> Attempt<Vec<u8>> {
        let mut node = inode;
        let mut node_ver = ver;
        loop {
            let Some((_, child)) = node.begin() else {
                return Err(Restart);
            };
            if !node.lock().check(node_ver) {
                return Err(Restart);
            }
            if child.is_leaf() {
                let leaf = unsafe { child.leaf_ref() };
                let leaf_key = leaf.key();
                if leaf_key.len() < depth + total {
                    return Err(Restart);
                }
                let bytes = leaf_key[depth..depth + total].to_vec();
                if !node.lock().check(node_ver) {
                    return Err(Restart);
                }
                return Ok(bytes);
            }
            let next = unsafe { NodeRef::<P>::from_ptr(child) };
            let next_ver = next.lock().try_read_lock().ok_or(Restart)?;
            if !node.lock().check(node_ver) {
                return Err(Restart);
            }
            node = next;
            node_ver = next_ver;
        }
    }

    // remove

    /// Removes `key`; `false` when absent.
    pub(crate) fn remove(&self, key: &[u8]) -> bool {
        if key.is_empty() {
            return false;
        }
        loop {
            match self.try_remove(key) {
                Ok(removed) => return removed,
                Err(Restart) => continue,
            }
        }
    }

    fn try_remove(&self, key: &[u8]) -> Attempt<bool> {
        let root_ver = self.root_lock.try_read_lock().ok_or(Restart)?;
        let root_ptr = self.root.load();
        if root_ptr.is_null() {
            if !self.root_lock.check(root_ver) {
                return Err(Restart);
            }
            return Ok(false);
        }
        if root_ptr.is_leaf() {
            let leaf = unsafe { root_ptr.leaf_ref() };
            if !self.root_lock.check(root_ver) {
                return Err(Restart);
            }
            if leaf.key() != key {
                return Ok(false);
            }
            let guard = WriteGuard::try_from(&self.root_lock, root_ver).ok_or(Restart)?;
            self.root.store(NodePtr::NULL);
            guard.unlock();
            self.retire(root_ptr);
            return Ok(true);
        }
        let mut parent_lock: &P::Lock = &self.root_lock;
        let mut parent_ver = root_ver;
        let mut parent_node: Option<NodeRef<'_, P>> = None;
        let mut parent_byte = 0u8;
        let mut node = root_ptr;
        let mut depth = 0usize;
        loop {
            let inode = unsafe { NodeRef::<P>::from_ptr(node) };
            let ver = inode.lock().try_read_lock().ok_or(Restart)?;
            if !parent_lock.check(parent_ver) {
                return Err(Restart);
            }
            let snap = inode.prefix();
            let rem = &key[depth..];
            let shared = snap.shared_with_stored(rem);
            if shared < snap.stored_len().min(rem.len()) || rem.len() < snap.total_len() {
                if !inode.lock().check(ver) {
                    return Err(Restart);
                }
                return Ok(false);
            }
            depth += snap.total_len();
            if depth >= key.len() {
                if !inode.lock().check(ver) {
                    return Err(Restart);
                }
                return Ok(false);
            }
            let key_byte = key[depth];
            let child = inode.find_child(key_byte);
            if !inode.lock().check(ver) {
                return Err(Restart);
            }
            let Some(child) = child else {
                return Ok(false);
            };
            if !child.is_leaf() {
                parent_lock = inode.lock();
                parent_ver = ver;
                parent_node = Some(inode);
                parent_byte = key_byte;
                node = child;
                depth += 1;
                continue;
            }
            let leaf = unsafe { child.leaf_ref() };
            if leaf.key() != key {
                return Ok(false);
            }
            return self.remove_leaf_child(
                key_byte, node, inode, ver, child, snap, parent_lock, parent_ver, parent_node,
                parent_byte,
            );
        }
    }

    /// Unlinks a matched leaf, shrinking or collapsing its parent node
    /// when the removal takes it below the kind minimum.
    #[allow(clippy::too_many_arguments)]
    fn remove_leaf_child(
        &self,
        key_byte: u8,
        node: NodePtr,
        inode: NodeRef<'_, P>,
        ver: Version,
        leaf_ptr: NodePtr,
        snap: PrefixSnapshot,
        parent_lock: &P::Lock,
        parent_ver: Version,
        parent_node: Option<NodeRef<'_, P>>,
        parent_byte: u8,
    ) -> Attempt<bool> {
        let count = inode.count();

        if let NodeRef::N4(n4) = inode {
            if count == Node4::<P>::MIN_SIZE {
                // Collapse: the surviving child moves into the parent
                // slot, absorbing this node's prefix and its key byte.
                let parent_guard = WriteGuard::try_from(parent_lock, parent_ver).ok_or(Restart)?;
                let node_guard = WriteGuard::try_from(inode.lock(), ver).ok_or(Restart)?;
                let (sibling_byte, sibling_ptr) = n4.other_child(key_byte);
                if sibling_ptr.is_leaf() {
                    // Leaves carry their full key; nothing to prepend.
                    self.write_parent_slot(parent_node, parent_byte, sibling_ptr);
                } else {
                    let sibling = unsafe { NodeRef::<P>::from_ptr(sibling_ptr) };
                    let sibling_ver = sibling.lock().try_read_lock().ok_or(Restart)?;
                    let sibling_guard =
                        WriteGuard::try_from(sibling.lock(), sibling_ver).ok_or(Restart)?;
                    sibling.header().prefix.prepend(snap, sibling_byte);
                    self.write_parent_slot(parent_node, parent_byte, sibling_ptr);
                    sibling_guard.unlock();
                }
                node_guard.unlock_and_obsolete();
                self.retire(node);
                parent_guard.unlock();
                self.retire(leaf_ptr);
                self.counters.shrank();
                return Ok(true);
            }
        }

        let at_minimum = match inode {
            NodeRef::N4(_) => false,
            NodeRef::N16(_) => count == Node16::<P>::MIN_SIZE,
            NodeRef::N48(_) => count == Node48::<P>::MIN_SIZE,
            NodeRef::N256(_) => count == Node256::<P>::MIN_SIZE,
        };
        if at_minimum {
            let parent_guard = WriteGuard::try_from(parent_lock, parent_ver).ok_or(Restart)?;
            let node_guard = WriteGuard::try_from(inode.lock(), ver).ok_or(Restart)?;
            let smaller = match inode {
                NodeRef::N16(n) => NodePtr::from_n4(Node4::shrink_from(n, key_byte)),
                NodeRef::N48(n) => NodePtr::from_n16(Node16::shrink_from(n, key_byte)),
                NodeRef::N256(n) => NodePtr::from_n48(Node48::shrink_from(n, key_byte)),
                NodeRef::N4(_) => unreachable!("four-child node has no smaller kind"),
            };
            self.register_new(smaller);
            self.counters.shrank();
            self.write_parent_slot(parent_node, parent_byte, smaller);
            node_guard.unlock_and_obsolete();
            self.retire(node);
            parent_guard.unlock();
            self.retire(leaf_ptr);
            return Ok(true);
        }

        // Plain removal: only this node changes.
        if !parent_lock.try_read_unlock(parent_ver) {
            return Err(Restart);
        }
        let node_guard = WriteGuard::try_from(inode.lock(), ver).ok_or(Restart)?;
        inode.remove_child(key_byte);
        node_guard.unlock();
        self.retire(leaf_ptr);
        Ok(true)
    }

    // teardown

    /// Empties the tree. Exclusive access; frees immediately.
    pub(crate) fn clear(&mut self) {
        let root = self.root.load();
        if !root.is_null() {
            unsafe { self.delete_subtree(root) };
        }
        self.root.store(NodePtr::NULL);
        self.counters.reset_structure();
    }

    /// Recursively frees a subtree.
    ///
    /// # Safety
    ///
    /// Caller must have exclusive access to the tree.
    unsafe fn delete_subtree(&self, ptr: NodePtr) {
        if !ptr.is_leaf() {
            let inode = NodeRef::<P>::from_ptr(ptr);
            let mut cursor = 0u16;
            while cursor <= 255 {
                match inode.gte_child(cursor as u8) {
                    Some((byte, child)) => {
                        self.delete_subtree(child);
                        if byte == 255 {
                            break;
                        }
                        cursor = byte as u16 + 1;
                    }
                    None => break,
                }
            }
        }
        ptr.drop_allocation::<P>();
    }
}

impl<P: TreePolicy> Drop for RadixTree<P> {
    fn drop(&mut self) {
        let root = self.root.load();
        if !root.is_null() {
            unsafe { self.delete_subtree(root) };
        }
    }
}

impl<P: TreePolicy> Default for RadixTree<P> {
    fn default() -> Self {
        Self::new()
    }
}
