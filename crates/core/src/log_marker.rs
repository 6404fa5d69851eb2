// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal record markers.

use crate::simple_display;

/// One-byte marker carried by an `Update` journal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LogMarker {
    TpcPVoteYes,
    TpcPVoteNo,
    TpcIVoteStart,
    TpcICommitting,
    TpcIAborting,
    MtpcPCommit,
    MtpcPAbort,
    MtpcIStartP,
    OoeStartNext,
    OoeUndo,
}

simple_display! {
    LogMarker {
        TpcPVoteYes => "tpc_p_vote_yes",
        TpcPVoteNo => "tpc_p_vote_no",
        TpcIVoteStart => "tpc_i_vote_start",
        TpcICommitting => "tpc_i_committing",
        TpcIAborting => "tpc_i_aborting",
        MtpcPCommit => "mtpc_p_commit",
        MtpcPAbort => "mtpc_p_abort",
        MtpcIStartP => "mtpc_i_start_p",
        OoeStartNext => "ooe_start_next",
        OoeUndo => "ooe_undo",
    }
}

/// The four record kinds a journal can hold for a given `op_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum JournalRecordKind {
    Start,
    Update,
    Committed,
    Aborted,
}

impl JournalRecordKind {
    /// Whether a record of this kind closes the operation — no further
    /// records should ever follow it for the same `op_id`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JournalRecordKind::Committed | JournalRecordKind::Aborted)
    }
}

simple_display! {
    JournalRecordKind {
        Start => "start",
        Update => "update",
        Committed => "committed",
        Aborted => "aborted",
    }
}
