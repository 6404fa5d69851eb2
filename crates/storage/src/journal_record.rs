// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The journal record format.
//!
//! Each record carries `(op_id, module=DistributedAtomicOp,
//! op_type=DistributedOp, status, payload)`; `module`/`op_type` are
//! constant for this crate's sole use of the journal (the source's journal
//! is shared across several DAO-unrelated record kinds, which this
//! reimplementation doesn't carry — see DESIGN.md) so they are not
//! represented as fields here.

use dao_core::log_marker::JournalRecordKind;
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use serde::{Deserialize, Serialize};

/// One durable entry in a journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRecord {
    pub op_id: OperationId,
    pub kind: JournalRecordKind,
    pub payload: JournalPayload,
    /// Milliseconds since epoch, for diagnostics only — no recovery logic
    /// depends on it.
    pub written_at_ms: u64,
}

/// Payload carried by a record, shaped per record kind:
/// `Start` carries `type` and `blob`; `Update` carries a one-byte marker;
/// `Committed`/`Aborted` carry nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JournalPayload {
    Begin { operation_type: OperationType, blob: Vec<u8> },
    Update { marker: dao_core::log_marker::LogMarker },
    Commit,
    Abort,
}

impl JournalRecord {
    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}
