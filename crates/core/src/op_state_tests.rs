// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::operation_id::OperationId;
use crate::operation_type::OperationType;
use crate::subtree::Subtree;

fn some_participant() -> Subtree {
    Subtree::new("10.0.0.1:7000", SubtreeEntry(1))
}

#[test]
fn rejects_zero_id() {
    let err = OpState::builder(OperationId::NONE, OperationType::CreateINode, vec![1])
        .participants(vec![some_participant()])
        .build()
        .unwrap_err();
    assert_eq!(err, InvariantViolation::ZeroId);
}

#[test]
fn rejects_empty_blob() {
    let err = OpState::builder(OperationId(1), OperationType::CreateINode, vec![])
        .participants(vec![some_participant()])
        .build()
        .unwrap_err();
    assert_eq!(err, InvariantViolation::EmptyBlob);
}

#[test]
fn rejects_missing_participants_for_non_ooe() {
    let err = OpState::builder(OperationId(1), OperationType::CreateINode, vec![1])
        .protocol(ProtocolKind::Tpc)
        .build()
        .unwrap_err();
    assert_eq!(err, InvariantViolation::MissingParticipants);
}

#[test]
fn allows_empty_participants_for_ooe_first_hop() {
    let state = OpState::builder(OperationId(1), OperationType::OoeLbTest, vec![1])
        .protocol(ProtocolKind::Ooe)
        .is_coordinator(true)
        .build()
        .expect("ooe first hop has no participants yet");
    assert!(state.is_ooe_first_hop());
}

#[test]
fn accepts_well_formed_tpc_state() {
    let state = OpState::builder(OperationId(1), OperationType::CreateINode, vec![1, 2, 3])
        .protocol(ProtocolKind::Tpc)
        .is_coordinator(true)
        .participants(vec![some_participant(), some_participant()])
        .received_votes(2)
        .build()
        .expect("well-formed state should build");
    assert_eq!(state.received_votes, 2);
    assert!(state.is_coordinator);
}
