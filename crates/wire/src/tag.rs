// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire tag assignment.
//!
//! Per the Open Question in spec.md §9 ("whether `MTPCOpReq` shares its
//! tag byte with `TPCOpReq` and `OOEOpReq` is unclear ... implementers
//! MUST assign distinct tags"), this crate is the one place those three
//! tags are told apart — every other component dispatches on the decoded
//! `Event` variant, never on the raw tag byte.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    TpcOpReq = 1,
    MtpcOpReq = 2,
    OoeOpReq = 3,
    TpcVoteReq = 4,
    TpcVoteYes = 5,
    TpcVoteNo = 6,
    TpcCommit = 7,
    TpcAbort = 8,
    TpcAck = 9,
    MtpcCommit = 10,
    MtpcAbort = 11,
    MtpcAck = 12,
    OoeAck = 13,
    OoeAborted = 14,
    NotResponsible = 15,
    EventReRequest = 16,
    ContentRequest = 17,
    ContentResponse = 18,
    StatusRequest = 19,
    StatusResponse = 20,
    TpcPrAbort = 21,
    TpcRVoteN = 22,
    TpcRVoteY = 23,
    TpcRVoteReq = 24,
    TpcRCommit = 25,
    MtpcRStatusReq = 26,
    MtpcRAbort = 27,
    MtpcRCommit = 28,
    OoeRAborted = 29,
    OoeRStatusReq = 30,
}

impl Tag {
    pub fn from_u8(byte: u8) -> Option<Self> {
        use Tag::*;
        Some(match byte {
            1 => TpcOpReq,
            2 => MtpcOpReq,
            3 => OoeOpReq,
            4 => TpcVoteReq,
            5 => TpcVoteYes,
            6 => TpcVoteNo,
            7 => TpcCommit,
            8 => TpcAbort,
            9 => TpcAck,
            10 => MtpcCommit,
            11 => MtpcAbort,
            12 => MtpcAck,
            13 => OoeAck,
            14 => OoeAborted,
            15 => NotResponsible,
            16 => EventReRequest,
            17 => ContentRequest,
            18 => ContentResponse,
            19 => StatusRequest,
            20 => StatusResponse,
            21 => TpcPrAbort,
            22 => TpcRVoteN,
            23 => TpcRVoteY,
            24 => TpcRVoteReq,
            25 => TpcRCommit,
            26 => MtpcRStatusReq,
            27 => MtpcRAbort,
            28 => MtpcRCommit,
            29 => OoeRAborted,
            30 => OoeRStatusReq,
            _ => return None,
        })
    }
}
