// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Per-thread QSBR state and the public thread-facing API.
//!
//! Each registered thread keeps its own pair of deferral intervals and
//! its view of the global epoch. The view is reconciled on every
//! `quiescent()` call and on every enqueue, which is what keeps a
//! request from being freed before every thread has quiesced after its
//! retirement.

use crate::qsbr::{
    state_epoch, state_thread_count, DeferredRequest, OrphanList, Qsbr,
};
use std::cell::RefCell;

#[cfg(debug_assertions)]
use std::collections::HashSet;

/// Per-thread QSBR bookkeeping.
struct PerThread {
    registered: bool,

    /// The epoch this thread last observed; the interval lists are
    /// relative to it.
    last_epoch: u32,

    /// Whether this thread already signalled quiescence in `last_epoch`.
    signaled: bool,

    /// Requests enqueued one observed epoch ago.
    previous: Vec<DeferredRequest>,

    /// Requests enqueued in the currently observed epoch.
    current: Vec<DeferredRequest>,

    /// Quiescent calls since the last epoch change, for stats.
    quiescent_states_since_epoch_change: u64,

    /// Pointers registered as actively accessed; quiescence must not be
    /// signalled while any are live.
    #[cfg(debug_assertions)]
    active_pointers: HashSet<usize>,
}

impl PerThread {
    fn new() -> Self {
        Self {
            registered: false,
            last_epoch: 0,
            signaled: false,
            previous: Vec::new(),
            current: Vec::new(),
            quiescent_states_since_epoch_change: 0,
            #[cfg(debug_assertions)]
            active_pointers: HashSet::new(),
        }
    }

    /// Reconciles the interval lists with the observed global epoch.
    /// Returns the batch that became safe to free, if any.
    fn observe(&mut self, global_epoch: u32) -> Option<Vec<DeferredRequest>> {
        if self.last_epoch == global_epoch {
            return None;
        }
        // A registered thread can lag the global epoch by at most one:
        // a further advance would need this thread's signal.
        debug_assert_eq!(self.last_epoch.wrapping_add(1), global_epoch);
        let batch = std::mem::take(&mut self.previous);
        self.previous = std::mem::take(&mut self.current);
        self.last_epoch = global_epoch;
        self.signaled = false;
        self.quiescent_states_since_epoch_change = 0;
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

thread_local! {
    static PER_THREAD: RefCell<PerThread> = RefCell::new(PerThread::new());
}

/// Registers the calling thread with QSBR. Must be called before the
/// thread operates on a concurrent index. No-op when already registered.
pub fn register_current_thread() {
    PER_THREAD.with(|cell| {
        let mut pt = cell.borrow_mut();
        if pt.registered {
            return;
        }
        debug_assert!(pt.previous.is_empty() && pt.current.is_empty());
        let epoch = Qsbr::instance().register_in_state();
        pt.registered = true;
        pt.last_epoch = epoch;
        pt.signaled = false;
        pt.quiescent_states_since_epoch_change = 0;
    });
}

/// Unregisters the calling thread. Deferred requests it still holds are
/// orphaned and freed on the regular epoch schedule.
pub fn unregister_current_thread() {
    PER_THREAD.with(|cell| {
        let mut pt = cell.borrow_mut();
        if !pt.registered {
            return;
        }
        #[cfg(debug_assertions)]
        debug_assert!(
            pt.active_pointers.is_empty(),
            "unregistering with active pointers"
        );
        let qsbr = Qsbr::instance();
        let previous = std::mem::take(&mut pt.previous);
        let current = std::mem::take(&mut pt.current);
        qsbr.orphan_requests(OrphanList::Previous, previous);
        qsbr.orphan_requests(OrphanList::Current, current);
        qsbr.unregister_in_state(pt.last_epoch, pt.signaled);
        pt.registered = false;
    });
}

/// Whether the calling thread is registered.
pub fn is_current_thread_registered() -> bool {
    PER_THREAD.with(|cell| cell.borrow().registered)
}

/// Signals that the calling thread holds no pointers into tree memory.
///
/// The first call in each epoch decrements the global signal counter;
/// repeated calls in the same epoch only update stats. The last thread
/// to signal advances the epoch and frees what became safe.
pub fn quiescent() {
    PER_THREAD.with(|cell| {
        let mut pt = cell.borrow_mut();
        if !pt.registered {
            return;
        }
        #[cfg(debug_assertions)]
        debug_assert!(
            pt.active_pointers.is_empty(),
            "quiescent state signalled with active pointers"
        );
        let qsbr = Qsbr::instance();
        let word = qsbr.load_state();
        let single_thread_mode = state_thread_count(word) == 1;
        if let Some(batch) = pt.observe(state_epoch(word)) {
            qsbr.execute_batch(batch);
        }
        if pt.signaled {
            pt.quiescent_states_since_epoch_change += 1;
        } else {
            let epoch = pt.last_epoch;
            pt.signaled = true;
            if qsbr.signal_in_state(epoch) {
                // This signal advanced the epoch; observe it right away
                // so this thread's own intervals rotate without an extra
                // call.
                let word = qsbr.load_state();
                if let Some(batch) = pt.observe(state_epoch(word)) {
                    qsbr.execute_batch(batch);
                }
            }
        }
        if single_thread_mode {
            // No other thread can hold pointers; skip the two-epoch
            // delay.
            let mut batch = std::mem::take(&mut pt.previous);
            batch.append(&mut pt.current);
            if !batch.is_empty() {
                qsbr.execute_batch(batch);
            }
        }
    });
}

/// Defers a deallocation until every registered thread has quiesced.
pub(crate) fn defer_free(request: DeferredRequest) {
    let qsbr = Qsbr::instance();
    qsbr.record_deferred(&request);
    PER_THREAD.with(|cell| {
        let mut pt = cell.borrow_mut();
        if pt.registered {
            let word = qsbr.load_state();
            if let Some(batch) = pt.observe(state_epoch(word)) {
                qsbr.execute_batch(batch);
            }
            pt.current.push(request);
        } else {
            // Unregistered threads must not hold back reclamation, but
            // registered readers may still hold the pointer.
            let word = qsbr.load_state();
            if state_thread_count(word) == 0 {
                qsbr.record_freed(&request);
                unsafe { request.execute() };
            } else {
                qsbr.orphan_requests(OrphanList::Current, vec![request]);
            }
        }
    });
}

/// Marks a pointer as actively accessed by this thread (debug builds).
#[cfg(debug_assertions)]
pub(crate) fn register_active_pointer(addr: usize) {
    PER_THREAD.with(|cell| {
        cell.borrow_mut().active_pointers.insert(addr);
    });
}

/// Clears an active-pointer registration (debug builds).
#[cfg(debug_assertions)]
pub(crate) fn deregister_active_pointer(addr: usize) {
    PER_THREAD.with(|cell| {
        cell.borrow_mut().active_pointers.remove(&addr);
    });
}

/// Signals a quiescent state when dropped.
///
/// For scopes that operate on a concurrent index and can promise they
/// hold no tree pointers at scope exit.
pub struct QuiescentGuard;

impl QuiescentGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QuiescentGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for QuiescentGuard {
    fn drop(&mut self) {
        quiescent();
    }
}

/// Pauses QSBR participation for the calling thread.
///
/// A thread about to block must not hold back epoch advance; pausing
/// unregisters it (orphaning any queued requests) and re-registers on
/// drop.
pub struct PauseGuard {
    was_registered: bool,
}

/// Pauses QSBR participation until the returned guard is dropped.
pub fn pause() -> PauseGuard {
    let was_registered = is_current_thread_registered();
    if was_registered {
        unregister_current_thread();
    }
    PauseGuard { was_registered }
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        if self.was_registered {
            register_current_thread();
        }
    }
}
