// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OperationStore: the in-memory index of all in-flight
//! operations plus the TPC vote-dedup set.
//!
//! Not internally synchronized — the single coarse lock named in spec.md
//! §5 is applied by whoever owns a `OperationStore` (`dao-engine::Dao`
//! wraps one in a `tokio::sync::Mutex`), not by this type itself. That
//! mirrors `Participants list inside an OpState: exclusively owned by the
//! store; read-only callers must hold the mutex" — the store enforces
//! nothing about locking; its caller does.

use dao_core::operation_id::OperationId;
use dao_core::op_state::OpState;
use dao_core::subtree::{PeerAddr, SubtreeEntry};
use dao_core::vote_dedup::VoteDedup;
use std::collections::HashMap;

#[derive(Default)]
pub struct OperationStore {
    operations: HashMap<OperationId, OpState>,
    votes: VoteDedup,
}

impl OperationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created `OpState`. Returns the previous state, if
    /// any — callers use this to detect the "at most one OpState per
    /// op_id" invariant being about to be violated.
    pub fn insert(&mut self, state: OpState) -> Option<OpState> {
        self.operations.insert(state.id, state)
    }

    pub fn get(&self, op_id: OperationId) -> Option<&OpState> {
        self.operations.get(&op_id)
    }

    pub fn get_mut(&mut self, op_id: OperationId) -> Option<&mut OpState> {
        self.operations.get_mut(&op_id)
    }

    pub fn remove(&mut self, op_id: OperationId) -> Option<OpState> {
        self.votes.drop_for(op_id);
        self.operations.remove(&op_id)
    }

    pub fn contains(&self, op_id: OperationId) -> bool {
        self.operations.contains_key(&op_id)
    }

    /// All in-flight operations whose `subtree_entry` is `journal_key`,
    /// for recovery reconciliation and diagnostics.
    pub fn iter_for_subtree(&self, journal_key: SubtreeEntry) -> impl Iterator<Item = &OpState> {
        self.operations.values().filter(move |op| op.subtree_entry == journal_key)
    }

    /// Record `sender`'s vote/ack for `op_id`. Returns `true` if this is
    /// the first time (the vote should be tallied), `false` if it's a
    /// duplicate to silently drop.
    pub fn try_record_vote(&mut self, op_id: OperationId, sender: &PeerAddr) -> bool {
        self.votes.try_record(op_id, sender)
    }

    pub fn drop_votes_for(&mut self, op_id: OperationId) {
        self.votes.drop_for(op_id);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
#[path = "operation_store_tests.rs"]
mod tests;
