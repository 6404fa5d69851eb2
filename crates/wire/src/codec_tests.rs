// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::status::Status;
use dao_core::subtree::SubtreeEntry;
use proptest::prelude::*;

fn arb_op_id() -> impl Strategy<Value = OperationId> {
    (1u64..u64::MAX).prop_map(OperationId)
}

fn arb_operation_type() -> impl Strategy<Value = OperationType> {
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

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::TpcCoordComp),
        Just(Status::TpcPartWaitVReqYes),
        Just(Status::TpcAborting),
        Just(Status::MtpcCoordComp),
        Just(Status::MtpcPartVoteSendYes),
        Just(Status::OoeComp),
        Just(Status::OoeWaitResultUndone),
    ]
}

fn arb_op_req() -> impl Strategy<Value = Event> {
    (arb_op_id(), arb_operation_type(), any::<u64>(), any::<u64>(), proptest::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(op_id, operation_type, a, b, blob)| Event::TpcOpReq {
            op_id,
            operation_type,
            self_subtree: SubtreeEntry(a),
            initiator_subtree: SubtreeEntry(b),
            blob,
        })
}

proptest! {
    #[test]
    fn op_req_round_trips(event in arb_op_req()) {
        let encoded = encode(&event);
        let decoded = decode(&encoded).expect("round trip must decode");
        prop_assert_eq!(decoded, event);
    }

    #[test]
    fn bodyless_ack_round_trips(op_id in arb_op_id()) {
        let event = Event::TpcAck { op_id };
        let decoded = decode(&encode(&event)).expect("round trip must decode");
        prop_assert_eq!(decoded, event);
    }

    #[test]
    fn status_response_round_trips(op_id in arb_op_id(), opposite_status in arb_status()) {
        let event = Event::StatusResponse { op_id, opposite_status };
        let decoded = decode(&encode(&event)).expect("round trip must decode");
        prop_assert_eq!(decoded, event);
    }

    #[test]
    fn content_response_round_trips(
        op_id in arb_op_id(),
        operation_type in arb_operation_type(),
        blob in proptest::collection::vec(any::<u8>(), 0..64),
        opposite_status in arb_status(),
    ) {
        let event = Event::ContentResponse { op_id, operation_type, blob, opposite_status };
        let decoded = decode(&encode(&event)).expect("round trip must decode");
        prop_assert_eq!(decoded, event);
    }
}

#[test]
fn empty_frame_is_truncated() {
    assert_eq!(decode(&[]), Err(ProtocolError::Truncated));
}

#[test]
fn header_only_frame_is_truncated() {
    assert_eq!(decode(&[1, 0, 0, 0]), Err(ProtocolError::Truncated));
}

#[test]
fn unknown_tag_is_rejected() {
    let mut frame = vec![200u8];
    frame.extend_from_slice(&7u64.to_le_bytes());
    assert_eq!(decode(&frame), Err(ProtocolError::UnknownTag(200)));
}

#[test]
fn bodyless_tag_with_trailing_bytes_is_rejected() {
    let mut frame = vec![Tag::TpcAck as u8];
    frame.extend_from_slice(&7u64.to_le_bytes());
    frame.push(0xFF);
    assert_eq!(decode(&frame), Err(ProtocolError::TrailingBytes(1)));
}

#[test]
fn op_req_with_short_blob_is_length_mismatch() {
    let mut frame = vec![Tag::TpcOpReq as u8];
    frame.extend_from_slice(&7u64.to_le_bytes());
    frame.push(0); // MoveSubtree
    frame.extend_from_slice(&1u64.to_le_bytes());
    frame.extend_from_slice(&2u64.to_le_bytes());
    frame.extend_from_slice(&10u32.to_le_bytes()); // claims 10 bytes of blob
    frame.extend_from_slice(&[1, 2, 3]); // only 3 supplied
    assert_eq!(decode(&frame), Err(ProtocolError::LengthMismatch));
}

#[test]
fn unknown_operation_type_byte_is_rejected() {
    let mut frame = vec![Tag::TpcOpReq as u8];
    frame.extend_from_slice(&7u64.to_le_bytes());
    frame.push(250);
    frame.extend_from_slice(&1u64.to_le_bytes());
    frame.extend_from_slice(&2u64.to_le_bytes());
    frame.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(decode(&frame), Err(ProtocolError::UnknownOperationType(250)));
}

#[test]
fn unknown_status_byte_is_rejected() {
    let mut frame = vec![Tag::StatusResponse as u8];
    frame.extend_from_slice(&7u64.to_le_bytes());
    frame.push(250);
    assert_eq!(decode(&frame), Err(ProtocolError::UnknownStatus(250)));
}

#[test]
fn distinct_protocol_op_req_tags_decode_to_distinct_variants() {
    let tpc = Event::TpcOpReq {
        op_id: OperationId(1),
        operation_type: OperationType::CreateINode,
        self_subtree: SubtreeEntry(1),
        initiator_subtree: SubtreeEntry(1),
        blob: vec![9],
    };
    let mtpc = Event::MtpcOpReq {
        op_id: OperationId(1),
        operation_type: OperationType::CreateINode,
        self_subtree: SubtreeEntry(1),
        initiator_subtree: SubtreeEntry(1),
        blob: vec![9],
    };
    assert_ne!(encode(&tpc), encode(&mtpc));
    assert_eq!(decode(&encode(&tpc)).unwrap(), tpc);
    assert_eq!(decode(&encode(&mtpc)).unwrap(), mtpc);
}
