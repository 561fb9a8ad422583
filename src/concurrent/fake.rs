// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! No-op stand-in for the optimistic lock.
//!
//! The single-threaded index compiles the same tree-algorithm source as
//! the concurrent one; with this lock every acquisition succeeds, every
//! check passes, and the whole protocol folds away at compile time.

use crate::concurrent::version::{Version, VersionLock};

/// Lock whose operations all succeed without doing anything.
#[derive(Default)]
pub struct FakeLock;

impl VersionLock for FakeLock {
    #[inline]
    fn try_read_lock(&self) -> Option<Version> {
        Some(Version::INITIAL)
    }

    #[inline]
    fn check(&self, _snapshot: Version) -> bool {
        true
    }

    #[inline]
    fn try_upgrade(&self, _snapshot: Version) -> bool {
        true
    }

    #[inline]
    fn write_unlock(&self) {}

    #[inline]
    fn write_unlock_and_obsolete(&self) {}
}
