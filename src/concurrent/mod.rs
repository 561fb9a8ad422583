// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! In-process concurrency primitives for the tree core.
//!
//! The tree algorithms are written once against the traits in this module
//! and compiled into two shapes:
//!
//! - **Optimistic**: a real version lock per node plus relaxed-atomic
//!   field cells, for the lock-free concurrent index.
//! - **Fake**: a no-op lock and plain cells, for the single-threaded
//!   index. Every check passes and the optimiser deletes the protocol.
//!
//! ## Lock word layout
//!
//! ```text
//! 63                                    2   1   0
//! ┌─────────────────────────────────────┬───┬───┐
//! │ version counter                     │ W │ O │
//! └─────────────────────────────────────┴───┴───┘
//!   W = write-locked    O = obsolete (terminal)
//! ```
//!
//! A reader snapshots the word, reads node fields, then re-checks the
//! word; any writer in between bumps the counter and the reader restarts.
//! A node marked obsolete is permanently invalid and queued for
//! reclamation.

pub mod cell;
pub mod fake;
pub mod policy;
pub mod version;

pub use cell::{AtomicCell, CellValue, PlainCell, SharedCell};
pub use fake::FakeLock;
pub use policy::{Concurrent, SingleThreaded, TreePolicy};
pub use version::{OptimisticLock, Version, VersionLock, WriteGuard};
