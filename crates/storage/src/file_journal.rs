// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A file-backed `JournalGateway`: one append-only, newline-delimited JSON
//! file per journal key, under a configured directory. Used by `dao-daemon`
//! and by integration tests that exercise durability across simulated
//! restarts (construct a fresh gateway from the same directory).
//!
//! Corruption handling follows the teacher's WAL: a line that fails to
//! parse is treated as the end of readable history rather than a hard
//! error, so a partially-written record from a crash mid-`write` doesn't
//! make the rest of the journal unreadable.

use crate::error::JournalError;
use crate::journal::JournalGateway;
use crate::journal_record::{JournalPayload, JournalRecord};
use async_trait::async_trait;
use dao_core::log_marker::{JournalRecordKind, LogMarker};
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::subtree::SubtreeEntry;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct FileJournalGateway {
    dir: PathBuf,
}

impl FileJournalGateway {
    /// Open (creating if absent) a journal directory. Individual journal
    /// files are created lazily on first append.
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, journal_key: SubtreeEntry) -> PathBuf {
        if journal_key.is_server_global() {
            self.dir.join("server-global.journal")
        } else {
            self.dir.join(format!("{}.journal", journal_key.0))
        }
    }

    fn append_line(path: &Path, record: &JournalRecord) -> Result<(), JournalError> {
        let line = serde_json::to_string(record).map_err(|e| JournalError::Corrupt(e.to_string()))?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }

    /// Read every well-formed record from `path`, stopping at the first
    /// line that fails to parse (treated as a torn write from a crash).
    fn read_all(path: &Path) -> Vec<JournalRecord> {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Vec::new();
        };
        let mut records = Vec::new();
        for line in contents.lines() {
            match serde_json::from_str::<JournalRecord>(line) {
                Ok(record) => records.push(record),
                Err(_) => break,
            }
        }
        records
    }

    fn last_terminal_guard(path: &Path, op_id: OperationId) -> Result<(), JournalError> {
        if Self::read_all(path).iter().rev().find(|r| r.op_id == op_id).is_some_and(JournalRecord::is_terminal) {
            return Err(JournalError::AlreadyTerminal(op_id));
        }
        Ok(())
    }

    fn now_ms() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Every journal key with a file on disk, for the startup scan
    /// (`dao-daemon` needs the full set of `known_journals` to pass to
    /// `run_startup_recovery`; it has no other way to learn which
    /// subtrees this server has ever journaled for).
    pub async fn known_journal_keys(&self) -> std::io::Result<Vec<SubtreeEntry>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            let mut keys = Vec::new();
            for entry in std::fs::read_dir(&dir)?.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("journal") {
                    continue;
                }
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
                if stem == "server-global" {
                    continue;
                }
                if let Ok(inode) = stem.parse::<u64>() {
                    keys.push(SubtreeEntry(inode));
                }
            }
            Ok(keys)
        })
        .await?
    }

    async fn append(&self, journal_key: SubtreeEntry, record: JournalRecord) -> Result<(), JournalError> {
        let path = self.path_for(journal_key);
        tokio::task::spawn_blocking(move || {
            Self::last_terminal_guard(&path, record.op_id)?;
            Self::append_line(&path, &record)
        })
        .await
        .map_err(|e| JournalError::Corrupt(e.to_string()))?
    }
}

#[async_trait]
impl JournalGateway for FileJournalGateway {
    async fn append_begin(
        &self,
        journal_key: SubtreeEntry,
        op_id: OperationId,
        operation_type: OperationType,
        blob: Vec<u8>,
    ) -> Result<(), JournalError> {
        self.append(
            journal_key,
            JournalRecord {
                op_id,
                kind: JournalRecordKind::Start,
                payload: JournalPayload::Begin { operation_type, blob },
                written_at_ms: Self::now_ms(),
            },
        )
        .await
    }

    async fn append_update(
        &self,
        journal_key: SubtreeEntry,
        op_id: OperationId,
        marker: LogMarker,
    ) -> Result<(), JournalError> {
        self.append(
            journal_key,
            JournalRecord {
                op_id,
                kind: JournalRecordKind::Update,
                payload: JournalPayload::Update { marker },
                written_at_ms: Self::now_ms(),
            },
        )
        .await
    }

    async fn append_commit(&self, journal_key: SubtreeEntry, op_id: OperationId) -> Result<(), JournalError> {
        self.append(
            journal_key,
            JournalRecord {
                op_id,
                kind: JournalRecordKind::Committed,
                payload: JournalPayload::Commit,
                written_at_ms: Self::now_ms(),
            },
        )
        .await
    }

    async fn append_abort(&self, journal_key: SubtreeEntry, op_id: OperationId) -> Result<(), JournalError> {
        self.append(
            journal_key,
            JournalRecord {
                op_id,
                kind: JournalRecordKind::Aborted,
                payload: JournalPayload::Abort,
                written_at_ms: Self::now_ms(),
            },
        )
        .await
    }

    async fn get_all_records_for(&self, op_id: OperationId) -> Option<(SubtreeEntry, Vec<JournalRecord>)> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            let entries = std::fs::read_dir(&dir).ok()?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("journal") {
                    continue;
                }
                let records: Vec<JournalRecord> =
                    Self::read_all(&path).into_iter().filter(|r| r.op_id == op_id).collect();
                if !records.is_empty() {
                    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
                    let key = if stem == "server-global" {
                        SubtreeEntry::SERVER_GLOBAL
                    } else {
                        SubtreeEntry(stem.parse().ok()?)
                    };
                    return Some((key, records));
                }
            }
            None
        })
        .await
        .ok()
        .flatten()
    }

    async fn enumerate_open(&self, journal_key: SubtreeEntry) -> HashSet<OperationId> {
        let path = self.path_for(journal_key);
        tokio::task::spawn_blocking(move || {
            let mut last_kind: std::collections::HashMap<OperationId, JournalRecordKind> =
                std::collections::HashMap::new();
            for record in Self::read_all(&path) {
                last_kind.insert(record.op_id, record.kind);
            }
            last_kind.into_iter().filter(|(_, kind)| !kind.is_terminal()).map(|(id, _)| id).collect()
        })
        .await
        .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "file_journal_tests.rs"]
mod tests;
