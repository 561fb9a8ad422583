// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Error types for ReedART operations.
//!
//! Provides structured error handling with detailed context for debugging.
//! Duplicate inserts and removals of absent keys are not errors; they are
//! reported through the `bool` results of the index operations.

use std::fmt;

/// Standard Result type for all ReedART operations.
pub type ReedResult<T> = Result<T, ReedError>;

/// Error types for ReedART operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReedError {
    /// Value longer than the leaf value-length field can store.
    ValueTooLong { len: usize },

    /// Encoded key longer than the key-length field can store.
    KeyTooLong { len: usize },

    /// Empty key passed to a tree operation.
    KeyEmpty,

    /// Key decoder asked to read past the end of the key buffer.
    DecodeOutOfBounds { wanted: usize, remaining: usize },

    /// Shell/script command not recognised.
    InvalidCommand { input: String, reason: String },

    /// Key literal in a shell/script command could not be parsed.
    InvalidKeyFormat { input: String, reason: String },

    /// I/O error during dump or script execution.
    IoError { operation: String, reason: String },
}

impl fmt::Display for ReedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueTooLong { len } => {
                write!(f, "Value too long: {} bytes (maximum: {})", len, u32::MAX)
            }
            Self::KeyTooLong { len } => {
                write!(f, "Key too long: {} bytes (maximum: {})", len, u32::MAX)
            }
            Self::KeyEmpty => {
                write!(f, "Empty key")
            }
            Self::DecodeOutOfBounds { wanted, remaining } => {
                write!(
                    f,
                    "Key decode out of bounds: wanted {} bytes, {} remaining",
                    wanted, remaining
                )
            }
            Self::InvalidCommand { input, reason } => {
                write!(f, "Invalid command '{}': {}", input, reason)
            }
            Self::InvalidKeyFormat { input, reason } => {
                write!(f, "Invalid key '{}': {}", input, reason)
            }
            Self::IoError { operation, reason } => {
                write!(f, "I/O error during '{}': {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for ReedError {}

// Convenience conversion from std::io::Error
impl From<std::io::Error> for ReedError {
    fn from(err: std::io::Error) -> Self {
        ReedError::IoError {
            operation: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}
