// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory `JournalGateway`, for fast unit tests of `RecoveryManager`
//! and the protocol engine that don't need real durability (SPEC_FULL.md §8).

use crate::error::JournalError;
use crate::journal::JournalGateway;
use crate::journal_record::{JournalPayload, JournalRecord};
use async_trait::async_trait;
use dao_core::log_marker::{JournalRecordKind, LogMarker};
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::subtree::SubtreeEntry;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct InMemoryJournalGateway {
    journals: Mutex<HashMap<SubtreeEntry, Vec<JournalRecord>>>,
    /// Index from op_id to the journal key holding its records, maintained
    /// alongside `journals` so `get_all_records_for` doesn't need a linear
    /// scan of every journal.
    index: Mutex<HashMap<OperationId, SubtreeEntry>>,
}

impl InMemoryJournalGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, journal_key: SubtreeEntry, record: JournalRecord) -> Result<(), JournalError> {
        let op_id = record.op_id;
        let mut journals = self.journals.lock();
        let entries = journals.entry(journal_key).or_default();
        if let Some(last) = entries.iter().rev().find(|r| r.op_id == op_id) {
            if last.is_terminal() {
                return Err(JournalError::AlreadyTerminal(op_id));
            }
        }
        entries.push(record);
        drop(journals);
        self.index.lock().insert(op_id, journal_key);
        Ok(())
    }

    fn now_ms() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl JournalGateway for InMemoryJournalGateway {
    async fn append_begin(
        &self,
        journal_key: SubtreeEntry,
        op_id: OperationId,
        operation_type: OperationType,
        blob: Vec<u8>,
    ) -> Result<(), JournalError> {
        self.push(
            journal_key,
            JournalRecord {
                op_id,
                kind: JournalRecordKind::Start,
                payload: JournalPayload::Begin { operation_type, blob },
                written_at_ms: Self::now_ms(),
            },
        )
    }

    async fn append_update(
        &self,
        journal_key: SubtreeEntry,
        op_id: OperationId,
        marker: LogMarker,
    ) -> Result<(), JournalError> {
        self.push(
            journal_key,
            JournalRecord {
                op_id,
                kind: JournalRecordKind::Update,
                payload: JournalPayload::Update { marker },
                written_at_ms: Self::now_ms(),
            },
        )
    }

    async fn append_commit(&self, journal_key: SubtreeEntry, op_id: OperationId) -> Result<(), JournalError> {
        self.push(
            journal_key,
            JournalRecord {
                op_id,
                kind: JournalRecordKind::Committed,
                payload: JournalPayload::Commit,
                written_at_ms: Self::now_ms(),
            },
        )
    }

    async fn append_abort(&self, journal_key: SubtreeEntry, op_id: OperationId) -> Result<(), JournalError> {
        self.push(
            journal_key,
            JournalRecord {
                op_id,
                kind: JournalRecordKind::Aborted,
                payload: JournalPayload::Abort,
                written_at_ms: Self::now_ms(),
            },
        )
    }

    async fn get_all_records_for(&self, op_id: OperationId) -> Option<(SubtreeEntry, Vec<JournalRecord>)> {
        let journal_key = *self.index.lock().get(&op_id)?;
        let journals = self.journals.lock();
        let records: Vec<JournalRecord> =
            journals.get(&journal_key)?.iter().filter(|r| r.op_id == op_id).cloned().collect();
        Some((journal_key, records))
    }

    async fn enumerate_open(&self, journal_key: SubtreeEntry) -> HashSet<OperationId> {
        let journals = self.journals.lock();
        let Some(entries) = journals.get(&journal_key) else {
            return HashSet::new();
        };
        let mut last_kind: HashMap<OperationId, JournalRecordKind> = HashMap::new();
        for record in entries {
            last_kind.insert(record.op_id, record.kind);
        }
        last_kind.into_iter().filter(|(_, kind)| !kind.is_terminal()).map(|(op_id, _)| op_id).collect()
    }
}

#[cfg(test)]
#[path = "memory_journal_tests.rs"]
mod tests;
