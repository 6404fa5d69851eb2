// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::op_state::OpState;
use crate::operation_id::OperationId;
use crate::operation_type::OperationType;
use crate::protocol::ProtocolKind;
use crate::status::Status;
use crate::subtree::{PeerAddr, Subtree, SubtreeEntry};
use std::time::{Duration, Instant};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::operation_type::OperationType;
    use crate::protocol::ProtocolKind;
    use proptest::prelude::*;

    pub fn arb_operation_type() -> impl Strategy<Value = OperationType> {
        prop_oneof![
            Just(OperationType::MoveSubtree),
            Just(OperationType::ChangePartitionOwnership),
            Just(OperationType::CreateINode),
            Just(OperationType::SetAttr),
            Just(OperationType::Rename),
            Just(OperationType::Unlink),
            Just(OperationType::Link),
            Just(OperationType::OrderedOperationTest),
            Just(OperationType::OoeLbTest),
        ]
    }

    pub fn arb_protocol_kind() -> impl Strategy<Value = ProtocolKind> {
        prop_oneof![Just(ProtocolKind::Tpc), Just(ProtocolKind::Mtpc), Just(ProtocolKind::Ooe)]
    }
}

// ── OpState factory helpers ─────────────────────────────────────────────

pub fn peer(addr: &str) -> PeerAddr {
    PeerAddr::new(addr)
}

pub fn participant(addr: &str, inode: u64) -> Subtree {
    Subtree::new(addr, SubtreeEntry(inode))
}

pub fn deadline_in(seconds: u64) -> Instant {
    Instant::now() + Duration::from_secs(seconds)
}

/// A minimal well-formed TPC coordinator state with `n` participants,
/// freshly started (`TpcCoordVReqSent`, all votes outstanding).
pub fn tpc_coordinator_state(op_id: u64, participants: usize) -> OpState {
    let subtrees: Vec<Subtree> =
        (0..participants).map(|i| participant(&format!("10.0.0.{}:7000", i + 1), i as u64 + 1)).collect();
    OpState::builder(OperationId(op_id), OperationType::CreateINode, vec![b'x'])
        .protocol(ProtocolKind::Tpc)
        .status(Status::TpcCoordVReqSent)
        .is_coordinator(true)
        .received_votes(participants)
        .participants(subtrees)
        .overall_deadline(deadline_in(30))
        .build()
        .expect("well-formed tpc coordinator fixture")
}

/// A minimal well-formed MTPC participant state, freshly materialized from
/// an inbound operation request.
pub fn mtpc_participant_state(op_id: u64, coordinator_addr: &str) -> OpState {
    OpState::builder(OperationId(op_id), OperationType::MoveSubtree, vec![b'x'])
        .protocol(ProtocolKind::Mtpc)
        .status(Status::MtpcPartComp)
        .is_coordinator(false)
        .participants(vec![participant(coordinator_addr, 0)])
        .subtree_entry(SubtreeEntry::SERVER_GLOBAL)
        .overall_deadline(deadline_in(30))
        .build()
        .expect("well-formed mtpc participant fixture")
}

/// A minimal well-formed OOE first-hop coordinator state.
pub fn ooe_first_hop_state(op_id: u64) -> OpState {
    OpState::builder(OperationId(op_id), OperationType::OoeLbTest, vec![b'x'])
        .protocol(ProtocolKind::Ooe)
        .status(Status::OoeWaitResult)
        .is_coordinator(true)
        .overall_deadline(deadline_in(30))
        .build()
        .expect("well-formed ooe first-hop fixture")
}
