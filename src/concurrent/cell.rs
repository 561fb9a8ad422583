// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Shared node-field cells.
//!
//! Every node field that is read inside a read critical section and
//! written under a write guard goes through one of these cells. The
//! atomic flavour uses relaxed loads and stores: the version check
//! provides the ordering, the atomicity only stops the compiler from
//! splitting an access into narrower ones that could tear.

use std::cell::Cell;
use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// Values that can live in a shared cell. Maps each value type to its
/// same-width atomic.
pub trait CellValue: Copy + 'static {
    type Atomic: Send + Sync;

    fn atomic_new(v: Self) -> Self::Atomic;
    fn atomic_load(a: &Self::Atomic) -> Self;
    fn atomic_store(a: &Self::Atomic, v: Self);
}

macro_rules! impl_cell_value {
    ($ty:ty, $atomic:ty) => {
        impl CellValue for $ty {
            type Atomic = $atomic;

            #[inline]
            fn atomic_new(v: Self) -> Self::Atomic {
                <$atomic>::new(v)
            }

            #[inline]
            fn atomic_load(a: &Self::Atomic) -> Self {
                a.load(Ordering::Relaxed)
            }

            #[inline]
            fn atomic_store(a: &Self::Atomic, v: Self) {
                a.store(v, Ordering::Relaxed)
            }
        }
    };
}

impl_cell_value!(u8, AtomicU8);
impl_cell_value!(u16, AtomicU16);
impl_cell_value!(u32, AtomicU32);
impl_cell_value!(u64, AtomicU64);
impl_cell_value!(usize, AtomicUsize);

/// Common cell interface; mutation goes through `&self` because under
/// the optimistic protocol many shared references exist concurrently.
pub trait SharedCell<T: CellValue> {
    fn new(v: T) -> Self;
    fn load(&self) -> T;
    fn store(&self, v: T);
}

/// Plain cell for the single-threaded index. `!Sync`, which is what keeps
/// that index from crossing threads.
pub struct PlainCell<T: CellValue>(Cell<T>);

impl<T: CellValue> SharedCell<T> for PlainCell<T> {
    #[inline]
    fn new(v: T) -> Self {
        Self(Cell::new(v))
    }

    #[inline]
    fn load(&self) -> T {
        self.0.get()
    }

    #[inline]
    fn store(&self, v: T) {
        self.0.set(v)
    }
}

/// Relaxed-atomic cell for the concurrent index.
pub struct AtomicCell<T: CellValue>(T::Atomic);

impl<T: CellValue> SharedCell<T> for AtomicCell<T> {
    #[inline]
    fn new(v: T) -> Self {
        Self(T::atomic_new(v))
    }

    #[inline]
    fn load(&self) -> T {
        T::atomic_load(&self.0)
    }

    #[inline]
    fn store(&self, v: T) {
        T::atomic_store(&self.0, v)
    }
}
