// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JournalGateway: the durable, append-only log of DAO
//! state transitions.
//!
//! All calls are idempotent under retry of identical arguments; a failed
//! append fails the caller and leaves the in-memory operation untouched —
//! it is retried by the timeout path, not rolled back.

use crate::error::JournalError;
use crate::journal_record::JournalRecord;
use async_trait::async_trait;
use dao_core::log_marker::LogMarker;
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::subtree::SubtreeEntry;
use std::collections::HashSet;

#[async_trait]
pub trait JournalGateway: Send + Sync {
    async fn append_begin(
        &self,
        journal_key: SubtreeEntry,
        op_id: OperationId,
        operation_type: OperationType,
        blob: Vec<u8>,
    ) -> Result<(), JournalError>;

    async fn append_update(
        &self,
        journal_key: SubtreeEntry,
        op_id: OperationId,
        marker: LogMarker,
    ) -> Result<(), JournalError>;

    async fn append_commit(&self, journal_key: SubtreeEntry, op_id: OperationId) -> Result<(), JournalError>;

    async fn append_abort(&self, journal_key: SubtreeEntry, op_id: OperationId) -> Result<(), JournalError>;

    /// Search every known journal for `op_id`, returning the first journal
    /// containing records for it. `None` if no journal has ever seen it.
    async fn get_all_records_for(&self, op_id: OperationId) -> Option<(SubtreeEntry, Vec<JournalRecord>)>;

    /// Operation ids in `journal_key` whose last record is not commit/abort.
    async fn enumerate_open(&self, journal_key: SubtreeEntry) -> HashSet<OperationId>;
}
