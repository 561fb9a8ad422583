// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Variant policy: the one type parameter threaded through the tree core.
//!
//! Selects the lock type, the shared-field cell type, and the reclamation
//! route, so `RadixTree<SingleThreaded>` and `RadixTree<Concurrent>` are
//! two instantiations of the same algorithms.

use crate::concurrent::cell::{AtomicCell, CellValue, PlainCell, SharedCell};
use crate::concurrent::fake::FakeLock;
use crate::concurrent::version::{OptimisticLock, VersionLock};

/// Compile-time selection of the synchronisation shape of a tree.
pub trait TreePolicy: Sized + 'static {
    type Lock: VersionLock;
    type Cell<T: CellValue>: SharedCell<T>;

    /// Whether node frees must be deferred through QSBR. When false the
    /// tree owns its nodes exclusively and frees them on the spot.
    const DEFERRED_RECLAIM: bool;
}

/// Exclusive-access policy: fake lock, plain cells, immediate free.
pub struct SingleThreaded;

impl TreePolicy for SingleThreaded {
    type Lock = FakeLock;
    type Cell<T: CellValue> = PlainCell<T>;

    const DEFERRED_RECLAIM: bool = false;
}

/// Optimistic-concurrency policy: version locks, relaxed-atomic cells,
/// frees routed through QSBR.
pub struct Concurrent;

impl TreePolicy for Concurrent {
    type Lock = OptimisticLock;
    type Cell<T: CellValue> = AtomicCell<T>;

    const DEFERRED_RECLAIM: bool = true;
}
