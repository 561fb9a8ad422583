// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Human-readable tree dump.
//!
//! The format is stable across reads of an unchanging tree but is not
//! part of the API contract. Traversal takes no locks; callers ensure
//! no concurrent writers.

use crate::art::inode::NodeRef;
use crate::art::ptr::{NodeKind, NodePtr};
use crate::art::tree::RadixTree;
use crate::concurrent::cell::SharedCell;
use crate::concurrent::policy::TreePolicy;
use std::io::{self, Write};

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

impl<P: TreePolicy> RadixTree<P> {
    /// Writes the tree structure to `w`.
    pub(crate) fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let stats = self.stats();
        writeln!(
            w,
            "ART: {} entries, {} internal nodes, {} resident bytes",
            stats.leaf_count,
            stats.inode_count(),
            stats.resident_bytes
        )?;
        let root = self.root.load();
        if root.is_null() {
            writeln!(w, "(empty)")?;
            return Ok(());
        }
        self.dump_node(w, root, 0, None)
    }

    fn dump_node<W: Write>(
        &self,
        w: &mut W,
        ptr: NodePtr,
        indent: usize,
        key_byte: Option<u8>,
    ) -> io::Result<()> {
        let pad = "  ".repeat(indent);
        let edge = match key_byte {
            Some(b) => format!("{:02x} -> ", b),
            None => String::new(),
        };
        if ptr.is_leaf() {
            let leaf = unsafe { ptr.leaf_ref() };
            writeln!(
                w,
                "{}{}leaf key={} value_len={}",
                pad,
                edge,
                hex(leaf.key()),
                leaf.value_len()
            )?;
            return Ok(());
        }
        let inode = unsafe { NodeRef::<P>::from_ptr(ptr) };
        let kind = match inode.kind() {
            NodeKind::N4 => "N4",
            NodeKind::N16 => "N16",
            NodeKind::N48 => "N48",
            NodeKind::N256 => "N256",
            NodeKind::Leaf => unreachable!(),
        };
        let snap = inode.prefix();
        let (window, stored) = snap.stored_bytes();
        writeln!(
            w,
            "{}{}{} count={} prefix={}{} len={}",
            pad,
            edge,
            kind,
            inode.count(),
            hex(&window[..stored]),
            if snap.is_fully_stored() { "" } else { ".." },
            snap.total_len()
        )?;
        let mut cursor = 0u16;
        while cursor <= 255 {
            match inode.gte_child(cursor as u8) {
                Some((byte, child)) => {
                    self.dump_node(w, child, indent + 1, Some(byte))?;
                    if byte == 255 {
                        break;
                    }
                    cursor = byte as u16 + 1;
                }
                None => break,
            }
        }
        Ok(())
    }
}
