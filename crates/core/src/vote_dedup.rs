// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The TPC vote-dedup set.
//!
//! REDESIGN FLAGS calls out the source's stringly-typed keys
//! `"{id}.{addr}"` for replacement with a typed set; this is that set.

use crate::operation_id::OperationId;
use crate::subtree::PeerAddr;
use std::collections::HashSet;

/// Makes TPC vote (and ack) tallies idempotent under message duplication.
///
/// Entries are `(op_id, sender)` pairs rather than the source's
/// concatenated strings, so no parsing or allocation is needed on the hot
/// path of counting a vote.
#[derive(Debug, Default)]
pub struct VoteDedup {
    seen: HashSet<(OperationId, PeerAddr)>,
}

impl VoteDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `sender`'s vote/ack for `op_id` has been counted.
    /// Returns `true` if this is the first time (the vote should be
    /// tallied), `false` if it was already recorded (a duplicate to drop).
    pub fn try_record(&mut self, op_id: OperationId, sender: &PeerAddr) -> bool {
        self.seen.insert((op_id, sender.clone()))
    }

    /// Drop every entry for `op_id` — called when the operation completes
    /// or when recovery prunes it.
    pub fn drop_for(&mut self, op_id: OperationId) {
        self.seen.retain(|(id, _)| *id != op_id);
    }

    #[cfg(test)]
    pub fn len_for(&self, op_id: OperationId) -> usize {
        self.seen.iter().filter(|(id, _)| *id == op_id).count()
    }
}

#[cfg(test)]
#[path = "vote_dedup_tests.rs"]
mod tests;
