// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Shell/script command handling.
//!
//! One `Session` wraps an index and parses the small command language
//! shared by the shell and the `exec` subcommand:
//!
//! ```text
//! put <key> <value...>    insert an entry
//! get <key>               look up a key
//! del <key>               remove a key
//! scan [n]                first n entries ascending (default all)
//! rscan [n]               first n entries descending
//! range <from> <to>       half-open range, direction from the bounds
//! count                   number of entries
//! stats                   tree structure counters
//! dump                    tree structure dump
//! clear                   remove everything
//! ```
//!
//! Keys are decimal `u64` literals (binary-comparable big-endian
//! encoding) or arbitrary strings, optionally double-quoted.

pub mod bench;
pub mod exec;
pub mod shell;
pub mod stats_demo;

use reedart::{ArtIndex, KeyEncoder, ReedError, ReedResult, TreeStats};

/// One displayed key/value pair.
pub struct Entry {
    pub key: String,
    pub value: String,
}

/// What a command produced.
pub enum Output {
    Message(String),
    Entries(Vec<Entry>),
    Stats(TreeStats),
    Dump(String),
    Exit,
}

/// An index plus the encoder reused for key literals.
pub struct Session {
    index: ArtIndex,
    encoder: KeyEncoder,
}

impl Session {
    pub fn new() -> Self {
        Self {
            index: ArtIndex::new(),
            encoder: KeyEncoder::new(),
        }
    }

    /// Parses a key literal: decimal `u64` or raw string bytes.
    fn parse_key(&mut self, token: &str) -> ReedResult<Vec<u8>> {
        if token.chars().all(|c| c.is_ascii_digit()) && !token.is_empty() {
            let value: u64 = token.parse().map_err(|_| ReedError::InvalidKeyFormat {
                input: token.to_string(),
                reason: "numeric key out of u64 range".to_string(),
            })?;
            self.encoder.reset().encode_u64(value);
            return Ok(self.encoder.view().to_vec());
        }
        let stripped = token
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(token);
        if stripped.is_empty() {
            return Err(ReedError::InvalidKeyFormat {
                input: token.to_string(),
                reason: "empty key".to_string(),
            });
        }
        Ok(stripped.as_bytes().to_vec())
    }

    /// Renders a stored key for display: 8-byte big-endian keys as
    /// numbers, the rest as (lossy) text.
    fn display_key(key: &[u8]) -> String {
        if key.len() == 8 && key[0] < 0x20 {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(key);
            return u64::from_be_bytes(bytes).to_string();
        }
        String::from_utf8_lossy(key).into_owned()
    }

    fn display_value(value: &[u8]) -> String {
        String::from_utf8_lossy(value).into_owned()
    }

    /// Executes one command line.
    pub fn execute(&mut self, line: &str) -> ReedResult<Output> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(Output::Message(String::new()));
        };
        match verb {
            "put" => {
                let key_token = parts.next().ok_or_else(|| missing(line, "key"))?;
                let key = self.parse_key(key_token)?;
                let value = parts.collect::<Vec<_>>().join(" ");
                let inserted = self.index.insert(&key, value.as_bytes())?;
                Ok(Output::Message(if inserted {
                    "OK".to_string()
                } else {
                    "duplicate key, unchanged".to_string()
                }))
            }
            "get" => {
                let key_token = parts.next().ok_or_else(|| missing(line, "key"))?;
                let key = self.parse_key(key_token)?;
                match self.index.get(&key) {
                    Some(value) => Ok(Output::Entries(vec![Entry {
                        key: Self::display_key(&key),
                        value: Self::display_value(value),
                    }])),
                    None => Ok(Output::Message("not found".to_string())),
                }
            }
            "del" => {
                let key_token = parts.next().ok_or_else(|| missing(line, "key"))?;
                let key = self.parse_key(key_token)?;
                Ok(Output::Message(if self.index.remove(&key) {
                    "OK".to_string()
                } else {
                    "not found".to_string()
                }))
            }
            "scan" | "rscan" => {
                let limit: usize = match parts.next() {
                    Some(n) => n.parse().map_err(|_| ReedError::InvalidCommand {
                        input: line.to_string(),
                        reason: "limit must be a number".to_string(),
                    })?,
                    None => usize::MAX,
                };
                let mut entries = Vec::new();
                self.index.scan(verb == "scan", |k, v| {
                    entries.push(Entry {
                        key: Self::display_key(k),
                        value: Self::display_value(v),
                    });
                    entries.len() >= limit
                });
                Ok(Output::Entries(entries))
            }
            "range" => {
                let from_token = parts.next().ok_or_else(|| missing(line, "from"))?;
                let to_token = parts.next().ok_or_else(|| missing(line, "to"))?;
                let from = self.parse_key(from_token)?;
                let to = self.parse_key(to_token)?;
                let mut entries = Vec::new();
                self.index.scan_range(&from, &to, |k, v| {
                    entries.push(Entry {
                        key: Self::display_key(k),
                        value: Self::display_value(v),
                    });
                    false
                });
                Ok(Output::Entries(entries))
            }
            "count" => Ok(Output::Message(self.index.len().to_string())),
            "stats" => Ok(Output::Stats(self.index.stats())),
            "dump" => {
                let mut out = Vec::new();
                self.index.dump(&mut out).map_err(|e| ReedError::IoError {
                    operation: "dump".to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Output::Dump(String::from_utf8_lossy(&out).into_owned()))
            }
            "clear" => {
                self.index.clear();
                Ok(Output::Message("OK".to_string()))
            }
            ".exit" | ".quit" | "exit" | "quit" => Ok(Output::Exit),
            other => Err(ReedError::InvalidCommand {
                input: other.to_string(),
                reason: "unknown verb (try .help)".to_string(),
            }),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(line: &str, what: &str) -> ReedError {
    ReedError::InvalidCommand {
        input: line.to_string(),
        reason: format!("missing {} argument", what),
    }
}
