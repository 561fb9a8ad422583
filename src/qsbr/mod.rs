// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Quiescent-State-Based Reclamation.
//!
//! The concurrent index never frees a node while a reader might still
//! hold a pointer into it. Instead, a node unlinked from the tree is
//! marked obsolete and its deallocation is deferred here. Registered
//! threads periodically signal quiescence, promising they hold no
//! pointers into tree memory at that instant; once every registered
//! thread has signalled inside an epoch, memory retired two epochs ago
//! is physically freed.
//!
//! ## Global state word
//!
//! ```text
//! 63            32 31          16 15           0
//! ┌───────────────┬──────────────┬──────────────┐
//! │ epoch         │ thread count │ still to     │
//! │ (wrapping)    │              │ signal       │
//! └───────────────┴──────────────┴──────────────┘
//! ```
//!
//! The last thread to signal in an epoch advances it and resets the
//! signal counter to the thread count.
//!
//! ## Deferral intervals
//!
//! Each thread keeps two request lists. A request enqueued while the
//! thread observes epoch `E` waits in `current`; when the thread observes
//! `E+1` the list moves to `previous`; when it observes `E+2` the batch
//! is freed. Both `quiescent()` and the enqueue path reconcile the
//! thread's epoch view first, so a request can never ride an interval
//! older than its actual retirement epoch.
//!
//! ## Orphans
//!
//! A thread that unregisters with deferred requests splices them onto
//! global orphan lists; the next epoch change drains them on the same
//! two-interval schedule. When the last thread unregisters, everything
//! still queued is freed outright.
//!
//! ## Example Usage
//!
//! ```rust
//! use reedart::qsbr;
//!
//! qsbr::register_current_thread();
//! // ... operate on an OlcIndex ...
//! qsbr::quiescent(); // no tree pointers held across this call
//! qsbr::unregister_current_thread();
//! ```

pub mod thread;

pub(crate) use thread::defer_free;
pub use thread::{
    is_current_thread_registered, pause, quiescent, register_current_thread,
    unregister_current_thread, PauseGuard, QuiescentGuard,
};

use once_cell::sync::Lazy;
use serde::Serialize;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicU64, Ordering};

/// One deferred deallocation: a type-erased pointer plus the function
/// that knows how to free it.
pub(crate) struct DeferredRequest {
    ptr: usize,
    drop_fn: unsafe fn(usize),
    bytes: usize,
}

impl DeferredRequest {
    pub(crate) fn new(ptr: usize, drop_fn: unsafe fn(usize), bytes: usize) -> Self {
        Self {
            ptr,
            drop_fn,
            bytes,
        }
    }

    pub(crate) fn bytes(&self) -> usize {
        self.bytes
    }

    /// Frees the memory. Caller guarantees no thread can still hold the
    /// pointer.
    pub(crate) unsafe fn execute(self) {
        (self.drop_fn)(self.ptr)
    }
}

// The pointer and drop function travel between threads via the orphan
// lists; the memory they describe is unreachable by then.
unsafe impl Send for DeferredRequest {}

/// Node of the lock-free orphan lists.
struct OrphanNode {
    requests: Vec<DeferredRequest>,
    next: *mut OrphanNode,
}

/// Snapshot of QSBR state and counters.
#[derive(Debug, Clone, Serialize)]
pub struct QsbrStats {
    pub epoch: u32,
    pub thread_count: u16,
    pub threads_in_previous_epoch: u16,
    pub epoch_changes: u64,
    pub deferred_count: u64,
    pub deferred_bytes: u64,
    pub freed_count: u64,
    pub freed_bytes: u64,
}

/// The global QSBR instance.
pub struct Qsbr {
    /// Packed epoch | thread count | threads still to signal.
    state: AtomicU64,

    /// Orphaned requests already one epoch old; freed at the next change.
    orphaned_previous: AtomicPtr<OrphanNode>,

    /// Orphaned requests from the current epoch.
    orphaned_current: AtomicPtr<OrphanNode>,

    epoch_changes: AtomicU64,
    deferred_count: AtomicU64,
    deferred_bytes: AtomicU64,
    freed_count: AtomicU64,
    freed_bytes: AtomicU64,
}

static INSTANCE: Lazy<Qsbr> = Lazy::new(Qsbr::new);

// state word packing

#[inline]
pub(crate) fn pack_state(epoch: u32, thread_count: u16, in_previous: u16) -> u64 {
    ((epoch as u64) << 32) | ((thread_count as u64) << 16) | in_previous as u64
}

#[inline]
pub(crate) fn state_epoch(word: u64) -> u32 {
    (word >> 32) as u32
}

#[inline]
pub(crate) fn state_thread_count(word: u64) -> u16 {
    (word >> 16) as u16
}

#[inline]
pub(crate) fn state_in_previous(word: u64) -> u16 {
    word as u16
}

impl Qsbr {
    fn new() -> Self {
        Self {
            state: AtomicU64::new(pack_state(0, 0, 0)),
            orphaned_previous: AtomicPtr::new(ptr::null_mut()),
            orphaned_current: AtomicPtr::new(ptr::null_mut()),
            epoch_changes: AtomicU64::new(0),
            deferred_count: AtomicU64::new(0),
            deferred_bytes: AtomicU64::new(0),
            freed_count: AtomicU64::new(0),
            freed_bytes: AtomicU64::new(0),
        }
    }

    /// The process-wide instance.
    pub fn instance() -> &'static Qsbr {
        &INSTANCE
    }

    pub(crate) fn load_state(&self) -> u64 {
        self.state.load(Ordering::Acquire)
    }

    /// Registers the calling thread in the state word. Spins while an
    /// epoch change is mid-flight. Returns the epoch joined.
    pub(crate) fn register_in_state(&self) -> u32 {
        loop {
            let old = self.state.load(Ordering::Acquire);
            let in_previous = state_in_previous(old);
            let thread_count = state_thread_count(old);
            if in_previous == 0 && thread_count > 0 {
                // The last signaller is publishing the next epoch.
                std::hint::spin_loop();
                continue;
            }
            let new = pack_state(state_epoch(old), thread_count + 1, in_previous + 1);
            if self
                .state
                .compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return state_epoch(old);
            }
        }
    }

    /// Removes the calling thread from the state word.
    ///
    /// `signaled_current` tells whether the thread already signalled in
    /// `thread_epoch`. Returns `true` when the removal advanced the
    /// epoch (the caller's lists were drained through the orphan path).
    pub(crate) fn unregister_in_state(&self, thread_epoch: u32, signaled_current: bool) -> bool {
        loop {
            let old = self.state.load(Ordering::Acquire);
            let epoch = state_epoch(old);
            let thread_count = state_thread_count(old);
            let in_previous = state_in_previous(old);
            debug_assert!(thread_count > 0);

            // Signalling an older epoch does not count for this one.
            let in_cohort = !(signaled_current && thread_epoch == epoch);
            if in_cohort && in_previous == 0 {
                // Epoch change mid-flight; wait for the new state.
                std::hint::spin_loop();
                continue;
            }
            let advance = in_cohort && in_previous == 1;
            let new = if advance {
                pack_state(epoch.wrapping_add(1), thread_count - 1, thread_count - 1)
            } else {
                pack_state(
                    epoch,
                    thread_count - 1,
                    if in_cohort { in_previous - 1 } else { in_previous },
                )
            };
            std::sync::atomic::fence(Ordering::Release);
            if self
                .state
                .compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                continue;
            }
            if advance {
                self.epoch_changes.fetch_add(1, Ordering::Relaxed);
                self.rotate_orphans();
            }
            if thread_count == 1 {
                // Last thread out: nothing can reference tree memory.
                self.drain_all_orphans();
            }
            return advance;
        }
    }

    /// Signals quiescence for the calling thread in `thread_epoch`.
    /// Returns `true` when this was the last signal of the epoch and the
    /// epoch was advanced.
    pub(crate) fn signal_in_state(&self, thread_epoch: u32) -> bool {
        std::sync::atomic::fence(Ordering::Release);
        let old = self.state.fetch_sub(1, Ordering::AcqRel);
        // The epoch cannot advance while this thread has not signalled.
        debug_assert_eq!(state_epoch(old), thread_epoch);
        debug_assert!(state_in_previous(old) >= 1);
        if state_in_previous(old) != 1 {
            return false;
        }
        // Last signal: drain orphans for the finished epoch, then publish.
        let freed = self.take_orphans_for_epoch_change();
        loop {
            let cur = self.state.load(Ordering::Acquire);
            debug_assert_eq!(state_epoch(cur), thread_epoch);
            debug_assert_eq!(state_in_previous(cur), 0);
            let thread_count = state_thread_count(cur);
            let new = pack_state(thread_epoch.wrapping_add(1), thread_count, thread_count);
            if self
                .state
                .compare_exchange_weak(cur, new, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                break;
            }
        }
        self.epoch_changes.fetch_add(1, Ordering::Relaxed);
        unsafe { self.free_chain(freed) };
        true
    }

    /// Swaps out both orphan lists, promotes current to previous, and
    /// returns the chain that is now safe to free.
    fn take_orphans_for_epoch_change(&self) -> *mut OrphanNode {
        let safe = self.orphaned_previous.swap(ptr::null_mut(), Ordering::AcqRel);
        let current = self.orphaned_current.swap(ptr::null_mut(), Ordering::AcqRel);
        self.splice_chain(&self.orphaned_previous, current);
        safe
    }

    /// Orphan-list rotation used by the unregister epoch-advance path.
    fn rotate_orphans(&self) {
        let safe = self.take_orphans_for_epoch_change();
        unsafe { self.free_chain(safe) };
    }

    /// Frees every orphaned request unconditionally. Only called when no
    /// thread is registered.
    fn drain_all_orphans(&self) {
        let prev = self.orphaned_previous.swap(ptr::null_mut(), Ordering::AcqRel);
        let cur = self.orphaned_current.swap(ptr::null_mut(), Ordering::AcqRel);
        unsafe {
            self.free_chain(prev);
            self.free_chain(cur);
        }
    }

    /// Splices a batch of requests onto an orphan list head.
    pub(crate) fn orphan_requests(&self, list: OrphanList, requests: Vec<DeferredRequest>) {
        if requests.is_empty() {
            return;
        }
        let head = match list {
            OrphanList::Previous => &self.orphaned_previous,
            OrphanList::Current => &self.orphaned_current,
        };
        let node = Box::into_raw(Box::new(OrphanNode {
            requests,
            next: ptr::null_mut(),
        }));
        self.splice_chain(head, node);
    }

    /// Pushes a whole chain onto a list head.
    fn splice_chain(&self, head: &AtomicPtr<OrphanNode>, chain: *mut OrphanNode) {
        if chain.is_null() {
            return;
        }
        // Find the tail of the incoming chain; it is exclusively ours.
        let mut tail = chain;
        unsafe {
            while !(*tail).next.is_null() {
                tail = (*tail).next;
            }
        }
        loop {
            let old_head = head.load(Ordering::Acquire);
            unsafe { (*tail).next = old_head };
            if head
                .compare_exchange_weak(old_head, chain, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return;
            }
        }
    }

    /// Frees a drained orphan chain.
    unsafe fn free_chain(&self, mut chain: *mut OrphanNode) {
        while !chain.is_null() {
            let node = Box::from_raw(chain);
            chain = node.next;
            for request in node.requests {
                self.record_freed(&request);
                request.execute();
            }
        }
    }

    pub(crate) fn record_deferred(&self, request: &DeferredRequest) {
        self.deferred_count.fetch_add(1, Ordering::Relaxed);
        self.deferred_bytes
            .fetch_add(request.bytes() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_freed(&self, request: &DeferredRequest) {
        self.freed_count.fetch_add(1, Ordering::Relaxed);
        self.freed_bytes
            .fetch_add(request.bytes() as u64, Ordering::Relaxed);
    }

    /// Executes a batch of requests that became safe to free.
    pub(crate) fn execute_batch(&self, batch: Vec<DeferredRequest>) {
        for request in batch {
            self.record_freed(&request);
            unsafe { request.execute() };
        }
    }

    /// Whether no thread is registered and nothing is queued.
    pub fn is_idle(&self) -> bool {
        let word = self.load_state();
        state_thread_count(word) == 0
            && self.orphaned_previous.load(Ordering::Acquire).is_null()
            && self.orphaned_current.load(Ordering::Acquire).is_null()
    }

    /// Snapshot of state and counters.
    pub fn stats(&self) -> QsbrStats {
        let word = self.load_state();
        QsbrStats {
            epoch: state_epoch(word),
            thread_count: state_thread_count(word),
            threads_in_previous_epoch: state_in_previous(word),
            epoch_changes: self.epoch_changes.load(Ordering::Relaxed),
            deferred_count: self.deferred_count.load(Ordering::Relaxed),
            deferred_bytes: self.deferred_bytes.load(Ordering::Relaxed),
            freed_count: self.freed_count.load(Ordering::Relaxed),
            freed_bytes: self.freed_bytes.load(Ordering::Relaxed),
        }
    }
}

/// Which orphan list a batch is spliced onto.
pub(crate) enum OrphanList {
    Previous,
    Current,
}
