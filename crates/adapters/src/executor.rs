// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The filesystem executor collaborator.
//!
//! Outbound requests are tagged `DAORequest`/`DAORedoRequest`/
//! `DAOUndoRequest`/`DAOReundoRequest`; inbound results are tagged
//! `ExecutionSuccessful`/`ExecutionUnsuccessful`/`UndoSuccessful`/
//! `UndoUnsuccessful`, with an OOE intermediate node additionally
//! discovering a `next_participant`. The three pure queries
//! (`set_sending_addresses`, `set_subtree_entry_point`, `is_coordinator`)
//! are exposed as-is.

use async_trait::async_trait;
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{PeerAddr, SubtreeEntry};

/// Outcome of a `do`/`redo`/`undo`/`reundo` request, as reported back by
/// the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorOutcome {
    /// `ExecutionSuccessful`. `next_participant` is populated only when the
    /// executor discovered the next hop of an OOE pipeline while applying
    /// the local mutation.
    ExecutionSuccessful { next_participant: Option<SubtreeEntry> },
    ExecutionUnsuccessful,
    UndoSuccessful,
    UndoUnsuccessful,
}

/// The external module that performs the local filesystem mutation this
/// operation's `operation_blob` describes, and reports success or failure
/// back to the DAO.
#[async_trait]
pub trait ExecutorClient: Send + Sync {
    async fn do_request(&self, op_id: OperationId, operation_type: OperationType, blob: &[u8]) -> ExecutorOutcome;

    async fn redo_request(&self, op_id: OperationId, operation_type: OperationType, blob: &[u8]) -> ExecutorOutcome;

    async fn undo_request(&self, op_id: OperationId, operation_type: OperationType, blob: &[u8]) -> ExecutorOutcome;

    async fn reundo_request(&self, op_id: OperationId, operation_type: OperationType, blob: &[u8]) -> ExecutorOutcome;

    /// Peer addresses this operation should send protocol messages to,
    /// resolved by the executor from `operation_blob` and the current MLT.
    async fn set_sending_addresses(&self, op_id: OperationId) -> Vec<PeerAddr>;

    /// Journal key this operation should be logged under.
    async fn set_subtree_entry_point(&self, op_id: OperationId) -> Option<SubtreeEntry>;

    /// Whether this server is the coordinator for `op_id`.
    async fn is_coordinator(&self, op_id: OperationId) -> bool;
}
