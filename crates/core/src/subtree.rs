// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subtree addressing: which server owns which part of the namespace, and
//! the journal key that part is logged under.

use std::fmt;

/// Address of an MDS peer, as resolved through the MLT collaborator.
///
/// Kept as an owned `String` rather than an inline buffer: peer addresses
/// are host:port pairs of unbounded length, unlike the fixed-width
/// generated ids elsewhere in this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PeerAddr(pub String);

impl PeerAddr {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PeerAddr {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PeerAddr {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Journal key identifying either a specific subtree's per-subtree journal,
/// or the reserved server-global journal used for `MoveSubtree` and
/// `ChangePartitionOwnership` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SubtreeEntry(pub u64);

impl SubtreeEntry {
    /// Sentinel journal key for the one server-global journal per MDS.
    pub const SERVER_GLOBAL: SubtreeEntry = SubtreeEntry(u64::MAX);

    pub fn is_server_global(&self) -> bool {
        *self == Self::SERVER_GLOBAL
    }
}

impl fmt::Display for SubtreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_server_global() {
            write!(f, "server-global")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A `{server_address, subtree_entry_inode}` pair: one participant's share
/// of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Subtree {
    pub server_address: PeerAddr,
    pub subtree_entry_inode: SubtreeEntry,
}

impl Subtree {
    pub fn new(server_address: impl Into<PeerAddr>, subtree_entry_inode: SubtreeEntry) -> Self {
        Self { server_address: server_address.into(), subtree_entry_inode }
    }
}

impl fmt::Display for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.subtree_entry_inode, self.server_address)
    }
}
