// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Internal-fatal conditions.
//!
//! The source raises an exception for "this should be structurally
//! impossible" conditions and lets it propagate out of the event loop. A
//! panic would do the same in Rust but is unrecoverable and untestable; a
//! `FatalError` the supervising task can match on and log before shutting
//! the affected worker down cleanly is the equivalent without the abort.

use crate::operation_id::OperationId;
use thiserror::Error;

/// Condition that should be structurally impossible given the invariants
/// enforced elsewhere in this workspace. Surfacing one means a bug, not a
/// transient or recoverable failure — the supervising task logs it at
/// `error` level and terminates the worker that raised it.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("operation {0} missing required participant list for its protocol")]
    MissingParticipants(OperationId),

    #[error("operation {0} journal reconstruction produced no begin record")]
    MissingJournalOrigin(OperationId),

    #[error("operation {0} reached status {status} with no matching transition rule")]
    UnhandledTransition { op_id: OperationId, status: String },

    #[error("operation {0} vote-dedup set corrupted: {detail}")]
    VoteDedupCorrupted(OperationId, String),

    #[error("journal for {0} produced a record after a terminal record")]
    RecordAfterTerminal(OperationId),

    #[error("operation store invariant violated: {0}")]
    StoreInvariant(#[from] crate::op_state::InvariantViolation),
}
