// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encode/decode between [`Event`] and wire bytes.
//!
//! Framing is `event_tag:u8 ∥ op_id:u64 ∥ body`, little-endian throughout,
//! identical across all three protocols. The decoder rejects any frame
//! whose declared length does not match its tag rather than reading past
//! the end of the buffer.

use crate::error::ProtocolError;
use crate::event::Event;
use crate::tag::Tag;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::status::Status;
use dao_core::subtree::SubtreeEntry;

const HEADER_LEN: usize = 9;

fn operation_type_to_u8(t: OperationType) -> u8 {
    match t {
        OperationType::MoveSubtree => 0,
        OperationType::ChangePartitionOwnership => 1,
        OperationType::CreateINode => 2,
        OperationType::SetAttr => 3,
        OperationType::Rename => 4,
        OperationType::Unlink => 5,
        OperationType::Link => 6,
        OperationType::OrderedOperationTest => 7,
        OperationType::OoeLbTest => 8,
    }
}

fn operation_type_from_u8(byte: u8) -> Result<OperationType, ProtocolError> {
    Ok(match byte {
        0 => OperationType::MoveSubtree,
        1 => OperationType::ChangePartitionOwnership,
        2 => OperationType::CreateINode,
        3 => OperationType::SetAttr,
        4 => OperationType::Rename,
        5 => OperationType::Unlink,
        6 => OperationType::Link,
        7 => OperationType::OrderedOperationTest,
        8 => OperationType::OoeLbTest,
        other => return Err(ProtocolError::UnknownOperationType(other)),
    })
}

fn status_to_u8(s: Status) -> u8 {
    use Status::*;
    match s {
        TpcCoordComp => 0,
        TpcCoordVReqSent => 1,
        TpcCoordVResultSent => 2,
        TpcPartComp => 3,
        TpcPartWaitVReqYes => 4,
        TpcPartWaitVReqNo => 5,
        TpcPartVReqRec => 6,
        TpcPartWaitVResultExpectYes => 7,
        TpcPartWaitVResultExpectNo => 8,
        TpcAborting => 9,
        TpcWaitUndoAck => 10,
        TpcWaitUndoToFinish => 11,
        MtpcCoordComp => 12,
        MtpcCoordReqSent => 13,
        MtpcCoordWaitResultUndone => 14,
        MtpcPartComp => 15,
        MtpcPartVoteSendYes => 16,
        MtpcPartVoteSendNo => 17,
        OoeComp => 18,
        OoeWaitResult => 19,
        OoeWaitResultUndone => 20,
    }
}

fn status_from_u8(byte: u8) -> Result<Status, ProtocolError> {
    use Status::*;
    Ok(match byte {
        0 => TpcCoordComp,
        1 => TpcCoordVReqSent,
        2 => TpcCoordVResultSent,
        3 => TpcPartComp,
        4 => TpcPartWaitVReqYes,
        5 => TpcPartWaitVReqNo,
        6 => TpcPartVReqRec,
        7 => TpcPartWaitVResultExpectYes,
        8 => TpcPartWaitVResultExpectNo,
        9 => TpcAborting,
        10 => TpcWaitUndoAck,
        11 => TpcWaitUndoToFinish,
        12 => MtpcCoordComp,
        13 => MtpcCoordReqSent,
        14 => MtpcCoordWaitResultUndone,
        15 => MtpcPartComp,
        16 => MtpcPartVoteSendYes,
        17 => MtpcPartVoteSendNo,
        18 => OoeComp,
        19 => OoeWaitResult,
        20 => OoeWaitResultUndone,
        other => return Err(ProtocolError::UnknownStatus(other)),
    })
}

fn put_header(buf: &mut BytesMut, tag: Tag, op_id: OperationId) {
    buf.put_u8(tag as u8);
    buf.put_u64_le(op_id.0);
}

fn put_op_req_body(
    buf: &mut BytesMut,
    operation_type: OperationType,
    self_subtree: SubtreeEntry,
    initiator_subtree: SubtreeEntry,
    blob: &[u8],
) {
    buf.put_u8(operation_type_to_u8(operation_type));
    buf.put_u64_le(self_subtree.0);
    buf.put_u64_le(initiator_subtree.0);
    buf.put_u32_le(blob.len() as u32);
    buf.put_slice(blob);
}

/// Serialize an [`Event`] to its wire representation.
pub fn encode(event: &Event) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + 16);
    let op_id = event.op_id();
    match event {
        Event::TpcOpReq { operation_type, self_subtree, initiator_subtree, blob, .. } => {
            put_header(&mut buf, Tag::TpcOpReq, op_id);
            put_op_req_body(&mut buf, *operation_type, *self_subtree, *initiator_subtree, blob);
        }
        Event::MtpcOpReq { operation_type, self_subtree, initiator_subtree, blob, .. } => {
            put_header(&mut buf, Tag::MtpcOpReq, op_id);
            put_op_req_body(&mut buf, *operation_type, *self_subtree, *initiator_subtree, blob);
        }
        Event::OoeOpReq { operation_type, self_subtree, initiator_subtree, blob, .. } => {
            put_header(&mut buf, Tag::OoeOpReq, op_id);
            put_op_req_body(&mut buf, *operation_type, *self_subtree, *initiator_subtree, blob);
        }
        Event::TpcVoteReq { .. } => put_header(&mut buf, Tag::TpcVoteReq, op_id),
        Event::TpcVoteYes { .. } => put_header(&mut buf, Tag::TpcVoteYes, op_id),
        Event::TpcVoteNo { .. } => put_header(&mut buf, Tag::TpcVoteNo, op_id),
        Event::TpcCommit { .. } => put_header(&mut buf, Tag::TpcCommit, op_id),
        Event::TpcAbort { .. } => put_header(&mut buf, Tag::TpcAbort, op_id),
        Event::TpcAck { .. } => put_header(&mut buf, Tag::TpcAck, op_id),
        Event::MtpcCommit { .. } => put_header(&mut buf, Tag::MtpcCommit, op_id),
        Event::MtpcAbort { .. } => put_header(&mut buf, Tag::MtpcAbort, op_id),
        Event::MtpcAck { .. } => put_header(&mut buf, Tag::MtpcAck, op_id),
        Event::OoeAck { .. } => put_header(&mut buf, Tag::OoeAck, op_id),
        Event::OoeAborted { .. } => put_header(&mut buf, Tag::OoeAborted, op_id),
        Event::NotResponsible { .. } => put_header(&mut buf, Tag::NotResponsible, op_id),
        Event::EventReRequest { .. } => put_header(&mut buf, Tag::EventReRequest, op_id),
        Event::ContentRequest { .. } => put_header(&mut buf, Tag::ContentRequest, op_id),
        Event::ContentResponse { operation_type, blob, opposite_status, .. } => {
            put_header(&mut buf, Tag::ContentResponse, op_id);
            buf.put_u8(operation_type_to_u8(*operation_type));
            buf.put_u32_le(blob.len() as u32);
            buf.put_slice(blob);
            buf.put_u8(status_to_u8(*opposite_status));
        }
        Event::StatusRequest { .. } => put_header(&mut buf, Tag::StatusRequest, op_id),
        Event::StatusResponse { opposite_status, .. } => {
            put_header(&mut buf, Tag::StatusResponse, op_id);
            buf.put_u8(status_to_u8(*opposite_status));
        }
        Event::TpcPrAbort { .. } => put_header(&mut buf, Tag::TpcPrAbort, op_id),
        Event::TpcRVoteN { .. } => put_header(&mut buf, Tag::TpcRVoteN, op_id),
        Event::TpcRVoteY { .. } => put_header(&mut buf, Tag::TpcRVoteY, op_id),
        Event::TpcRVoteReq { .. } => put_header(&mut buf, Tag::TpcRVoteReq, op_id),
        Event::TpcRCommit { .. } => put_header(&mut buf, Tag::TpcRCommit, op_id),
        Event::MtpcRStatusReq { .. } => put_header(&mut buf, Tag::MtpcRStatusReq, op_id),
        Event::MtpcRAbort { .. } => put_header(&mut buf, Tag::MtpcRAbort, op_id),
        Event::MtpcRCommit { .. } => put_header(&mut buf, Tag::MtpcRCommit, op_id),
        Event::OoeRAborted { .. } => put_header(&mut buf, Tag::OoeRAborted, op_id),
        Event::OoeRStatusReq { .. } => put_header(&mut buf, Tag::OoeRStatusReq, op_id),
    }
    buf.freeze()
}

fn read_op_req_body(buf: &mut Bytes) -> Result<(OperationType, SubtreeEntry, SubtreeEntry, Vec<u8>), ProtocolError> {
    if buf.remaining() < 1 + 8 + 8 + 4 {
        return Err(ProtocolError::Truncated);
    }
    let operation_type = operation_type_from_u8(buf.get_u8())?;
    let self_subtree = SubtreeEntry(buf.get_u64_le());
    let initiator_subtree = SubtreeEntry(buf.get_u64_le());
    let blob_len = buf.get_u32_le() as usize;
    if buf.remaining() != blob_len {
        return Err(ProtocolError::LengthMismatch);
    }
    let blob = buf.copy_to_bytes(blob_len).to_vec();
    Ok((operation_type, self_subtree, initiator_subtree, blob))
}

/// Parse a wire frame into an [`Event`]. Rejects frames whose declared
/// length does not match the tag rather than reading out of bounds.
pub fn decode(frame: &[u8]) -> Result<Event, ProtocolError> {
    if frame.len() < HEADER_LEN {
        return Err(ProtocolError::Truncated);
    }
    let mut buf = Bytes::copy_from_slice(frame);
    let tag_byte = buf.get_u8();
    let tag = Tag::from_u8(tag_byte).ok_or(ProtocolError::UnknownTag(tag_byte))?;
    let op_id = OperationId(buf.get_u64_le());

    let event = match tag {
        Tag::TpcOpReq => {
            let (operation_type, self_subtree, initiator_subtree, blob) = read_op_req_body(&mut buf)?;
            Event::TpcOpReq { op_id, operation_type, self_subtree, initiator_subtree, blob }
        }
        Tag::MtpcOpReq => {
            let (operation_type, self_subtree, initiator_subtree, blob) = read_op_req_body(&mut buf)?;
            Event::MtpcOpReq { op_id, operation_type, self_subtree, initiator_subtree, blob }
        }
        Tag::OoeOpReq => {
            let (operation_type, self_subtree, initiator_subtree, blob) = read_op_req_body(&mut buf)?;
            Event::OoeOpReq { op_id, operation_type, self_subtree, initiator_subtree, blob }
        }
        Tag::TpcVoteReq => no_body(buf, Event::TpcVoteReq { op_id })?,
        Tag::TpcVoteYes => no_body(buf, Event::TpcVoteYes { op_id })?,
        Tag::TpcVoteNo => no_body(buf, Event::TpcVoteNo { op_id })?,
        Tag::TpcCommit => no_body(buf, Event::TpcCommit { op_id })?,
        Tag::TpcAbort => no_body(buf, Event::TpcAbort { op_id })?,
        Tag::TpcAck => no_body(buf, Event::TpcAck { op_id })?,
        Tag::MtpcCommit => no_body(buf, Event::MtpcCommit { op_id })?,
        Tag::MtpcAbort => no_body(buf, Event::MtpcAbort { op_id })?,
        Tag::MtpcAck => no_body(buf, Event::MtpcAck { op_id })?,
        Tag::OoeAck => no_body(buf, Event::OoeAck { op_id })?,
        Tag::OoeAborted => no_body(buf, Event::OoeAborted { op_id })?,
        Tag::NotResponsible => no_body(buf, Event::NotResponsible { op_id })?,
        Tag::EventReRequest => no_body(buf, Event::EventReRequest { op_id })?,
        Tag::ContentRequest => no_body(buf, Event::ContentRequest { op_id })?,
        Tag::ContentResponse => {
            if buf.remaining() < 1 + 4 {
                return Err(ProtocolError::Truncated);
            }
            let operation_type = operation_type_from_u8(buf.get_u8())?;
            let blob_len = buf.get_u32_le() as usize;
            if buf.remaining() < blob_len + 1 {
                return Err(ProtocolError::LengthMismatch);
            }
            let blob = buf.copy_to_bytes(blob_len).to_vec();
            if buf.remaining() != 1 {
                return Err(ProtocolError::LengthMismatch);
            }
            let opposite_status = status_from_u8(buf.get_u8())?;
            Event::ContentResponse { op_id, operation_type, blob, opposite_status }
        }
        Tag::StatusRequest => no_body(buf, Event::StatusRequest { op_id })?,
        Tag::StatusResponse => {
            if buf.remaining() != 1 {
                return Err(ProtocolError::LengthMismatch);
            }
            let opposite_status = status_from_u8(buf.get_u8())?;
            Event::StatusResponse { op_id, opposite_status }
        }
        Tag::TpcPrAbort => no_body(buf, Event::TpcPrAbort { op_id })?,
        Tag::TpcRVoteN => no_body(buf, Event::TpcRVoteN { op_id })?,
        Tag::TpcRVoteY => no_body(buf, Event::TpcRVoteY { op_id })?,
        Tag::TpcRVoteReq => no_body(buf, Event::TpcRVoteReq { op_id })?,
        Tag::TpcRCommit => no_body(buf, Event::TpcRCommit { op_id })?,
        Tag::MtpcRStatusReq => no_body(buf, Event::MtpcRStatusReq { op_id })?,
        Tag::MtpcRAbort => no_body(buf, Event::MtpcRAbort { op_id })?,
        Tag::MtpcRCommit => no_body(buf, Event::MtpcRCommit { op_id })?,
        Tag::OoeRAborted => no_body(buf, Event::OoeRAborted { op_id })?,
        Tag::OoeRStatusReq => no_body(buf, Event::OoeRStatusReq { op_id })?,
    };
    Ok(event)
}

/// Bodyless tags must consume exactly the header; any remaining bytes
/// indicate a mismatched declared length.
fn no_body(buf: Bytes, event: Event) -> Result<Event, ProtocolError> {
    if buf.remaining() != 0 {
        return Err(ProtocolError::TrailingBytes(buf.remaining()));
    }
    Ok(event)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
