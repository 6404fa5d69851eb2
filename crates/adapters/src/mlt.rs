// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The metadata lookup table collaborator: resolves which peer owns a
//! subtree via the path configured as `MLT_PATH`.
//!
//! The DAO never reads the MLT file itself; every lookup goes through this
//! trait, the same adapter-boundary style used elsewhere around external
//! processes.

use async_trait::async_trait;
use dao_core::subtree::{PeerAddr, SubtreeEntry};

use crate::error::MltError;

/// Resolves which peer currently owns a subtree.
#[async_trait]
pub trait MltClient: Send + Sync {
    /// Look up the peer that owns `subtree` right now.
    async fn owner_of(&self, subtree: SubtreeEntry) -> Result<PeerAddr, MltError>;

    /// Record that `subtree` moved to `new_owner`, following a
    /// `NotResponsible` reply.
    async fn record_move(&self, subtree: SubtreeEntry, new_owner: PeerAddr);
}
