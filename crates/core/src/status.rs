// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-protocol, per-role operation status.
//!
//! One flat enum rather than three nested ones: the transition tables in
//! `dao-engine` switch on `(protocol, is_coordinator, status)` as a triple
//! anyway, and a flat enum makes the `TimeoutEntry::recorded_status`
//! comparison — a timeout fires only if the current status still equals
//! the one recorded when it was scheduled — a plain `==` with no
//! protocol-specific unwrapping.

use crate::simple_display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Status {
    // -- TPC coordinator --
    TpcCoordComp,
    TpcCoordVReqSent,
    TpcCoordVResultSent,

    // -- TPC participant --
    TpcPartComp,
    TpcPartWaitVReqYes,
    TpcPartWaitVReqNo,
    TpcPartVReqRec,
    TpcPartWaitVResultExpectYes,
    TpcPartWaitVResultExpectNo,

    // -- TPC abort branches, shared by coordinator and participant role --
    TpcAborting,
    TpcWaitUndoAck,
    TpcWaitUndoToFinish,

    // -- MTPC coordinator --
    MtpcCoordComp,
    MtpcCoordReqSent,
    MtpcCoordWaitResultUndone,

    // -- MTPC participant --
    MtpcPartComp,
    MtpcPartVoteSendYes,
    MtpcPartVoteSendNo,

    // -- OOE --
    OoeComp,
    OoeWaitResult,
    OoeWaitResultUndone,
}

impl Status {
    /// True for the abort-branch statuses shared across TPC roles; used by
    /// the dispatcher to recognize "already aborting" without needing to
    /// also know whether this server is coordinator or participant.
    pub fn is_tpc_abort_branch(&self) -> bool {
        matches!(self, Status::TpcAborting | Status::TpcWaitUndoAck | Status::TpcWaitUndoToFinish)
    }

    pub fn is_undo_wait(&self) -> bool {
        matches!(
            self,
            Status::TpcWaitUndoAck
                | Status::TpcWaitUndoToFinish
                | Status::MtpcCoordWaitResultUndone
                | Status::OoeWaitResultUndone
        )
    }
}

simple_display! {
    Status {
        TpcCoordComp => "tpc_coord_comp",
        TpcCoordVReqSent => "tpc_coord_vreq_sent",
        TpcCoordVResultSent => "tpc_coord_vresult_sent",
        TpcPartComp => "tpc_part_comp",
        TpcPartWaitVReqYes => "tpc_part_wait_vreq_yes",
        TpcPartWaitVReqNo => "tpc_part_wait_vreq_no",
        TpcPartVReqRec => "tpc_part_vreq_rec",
        TpcPartWaitVResultExpectYes => "tpc_part_wait_vresult_expect_yes",
        TpcPartWaitVResultExpectNo => "tpc_part_wait_vresult_expect_no",
        TpcAborting => "tpc_aborting",
        TpcWaitUndoAck => "tpc_wait_undo_ack",
        TpcWaitUndoToFinish => "tpc_wait_undo_to_finish",
        MtpcCoordComp => "mtpc_coord_comp",
        MtpcCoordReqSent => "mtpc_coord_req_sent",
        MtpcCoordWaitResultUndone => "mtpc_coord_wait_result_undone",
        MtpcPartComp => "mtpc_part_comp",
        MtpcPartVoteSendYes => "mtpc_part_vote_send_yes",
        MtpcPartVoteSendNo => "mtpc_part_vote_send_no",
        OoeComp => "ooe_comp",
        OoeWaitResult => "ooe_wait_result",
        OoeWaitResultUndone => "ooe_wait_result_undone",
    }
}
