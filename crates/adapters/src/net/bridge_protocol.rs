// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire framing between `TcpExecutorClient` and the external filesystem
//! executor process: `request_tag:u8 ∥ blob:[u8]`, extended here with an
//! `op_id` so responses on the shared connection can be correlated back to
//! the request that produced them, and with the three pure-query request
//! kinds alongside the four do/redo/undo/reundo requests.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{PeerAddr, SubtreeEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestTag {
    DaoRequest = 1,
    DaoRedoRequest = 2,
    DaoUndoRequest = 3,
    DaoReundoRequest = 4,
    SendingAddresses = 5,
    SubtreeEntryPoint = 6,
    IsCoordinator = 7,
}

pub enum Request {
    Do { op_id: OperationId, operation_type: OperationType, blob: Bytes },
    Redo { op_id: OperationId, operation_type: OperationType, blob: Bytes },
    Undo { op_id: OperationId, operation_type: OperationType, blob: Bytes },
    Reundo { op_id: OperationId, operation_type: OperationType, blob: Bytes },
    SendingAddresses { op_id: OperationId },
    SubtreeEntryPoint { op_id: OperationId },
    IsCoordinator { op_id: OperationId },
}

impl Request {
    pub fn op_id(&self) -> OperationId {
        match self {
            Request::Do { op_id, .. }
            | Request::Redo { op_id, .. }
            | Request::Undo { op_id, .. }
            | Request::Reundo { op_id, .. }
            | Request::SendingAddresses { op_id }
            | Request::SubtreeEntryPoint { op_id }
            | Request::IsCoordinator { op_id } => *op_id,
        }
    }

    pub fn tag(&self) -> RequestTag {
        match self {
            Request::Do { .. } => RequestTag::DaoRequest,
            Request::Redo { .. } => RequestTag::DaoRedoRequest,
            Request::Undo { .. } => RequestTag::DaoUndoRequest,
            Request::Reundo { .. } => RequestTag::DaoReundoRequest,
            Request::SendingAddresses { .. } => RequestTag::SendingAddresses,
            Request::SubtreeEntryPoint { .. } => RequestTag::SubtreeEntryPoint,
            Request::IsCoordinator { .. } => RequestTag::IsCoordinator,
        }
    }
}

fn operation_type_to_u8(t: OperationType) -> u8 {
    use OperationType::*;
    match t {
        MoveSubtree => 0,
        ChangePartitionOwnership => 1,
        CreateINode => 2,
        SetAttr => 3,
        Rename => 4,
        Unlink => 5,
        Link => 6,
        OrderedOperationTest => 7,
        OoeLbTest => 8,
    }
}

fn operation_type_from_u8(b: u8) -> Option<OperationType> {
    use OperationType::*;
    Some(match b {
        0 => MoveSubtree,
        1 => ChangePartitionOwnership,
        2 => CreateINode,
        3 => SetAttr,
        4 => Rename,
        5 => Unlink,
        6 => Link,
        7 => OrderedOperationTest,
        8 => OoeLbTest,
        _ => return None,
    })
}

pub fn encode_request(req: &Request) -> Bytes {
    let mut buf = BytesMut::with_capacity(32);
    buf.put_u8(req.tag() as u8);
    buf.put_u64_le(req.op_id().0);
    match req {
        Request::Do { operation_type, blob, .. }
        | Request::Redo { operation_type, blob, .. }
        | Request::Undo { operation_type, blob, .. }
        | Request::Reundo { operation_type, blob, .. } => {
            buf.put_u8(operation_type_to_u8(*operation_type));
            buf.put_u32_le(blob.len() as u32);
            buf.put_slice(blob);
        }
        Request::SendingAddresses { .. } | Request::SubtreeEntryPoint { .. } | Request::IsCoordinator { .. } => {}
    }
    buf.freeze()
}

/// What `TcpExecutorClient` gets back for one correlated request, keyed by
/// `(op_id, RequestTag)` on the reader side.
#[derive(Debug, Clone)]
pub enum Response {
    ExecutionSuccessful { next_participant: Option<SubtreeEntry> },
    ExecutionUnsuccessful,
    UndoSuccessful,
    UndoUnsuccessful,
    SendingAddresses(Vec<PeerAddr>),
    SubtreeEntryPoint(Option<SubtreeEntry>),
    IsCoordinator(bool),
}

pub fn decode_response(tag: RequestTag, body: &[u8]) -> Option<(OperationId, Response)> {
    let mut buf = Bytes::copy_from_slice(body);
    if buf.remaining() < 8 {
        return None;
    }
    let op_id = OperationId(buf.get_u64_le());
    let response = match tag {
        RequestTag::DaoRequest | RequestTag::DaoRedoRequest => {
            if buf.remaining() < 1 {
                return None;
            }
            match buf.get_u8() {
                0 => Response::ExecutionUnsuccessful,
                1 => Response::ExecutionSuccessful { next_participant: None },
                2 => {
                    if buf.remaining() < 8 {
                        return None;
                    }
                    Response::ExecutionSuccessful { next_participant: Some(SubtreeEntry(buf.get_u64_le())) }
                }
                _ => return None,
            }
        }
        RequestTag::DaoUndoRequest | RequestTag::DaoReundoRequest => {
            if buf.remaining() < 1 {
                return None;
            }
            match buf.get_u8() {
                0 => Response::UndoUnsuccessful,
                1 => Response::UndoSuccessful,
                _ => return None,
            }
        }
        RequestTag::SendingAddresses => {
            if buf.remaining() < 4 {
                return None;
            }
            let count = buf.get_u32_le() as usize;
            let mut addrs = Vec::with_capacity(count);
            for _ in 0..count {
                if buf.remaining() < 4 {
                    return None;
                }
                let len = buf.get_u32_le() as usize;
                if buf.remaining() < len {
                    return None;
                }
                let bytes = buf.copy_to_bytes(len);
                addrs.push(PeerAddr::new(String::from_utf8_lossy(&bytes).into_owned()));
            }
            Response::SendingAddresses(addrs)
        }
        RequestTag::SubtreeEntryPoint => {
            if buf.remaining() < 1 {
                return None;
            }
            match buf.get_u8() {
                0 => Response::SubtreeEntryPoint(None),
                1 => {
                    if buf.remaining() < 8 {
                        return None;
                    }
                    Response::SubtreeEntryPoint(Some(SubtreeEntry(buf.get_u64_le())))
                }
                _ => return None,
            }
        }
        RequestTag::IsCoordinator => {
            if buf.remaining() < 1 {
                return None;
            }
            Response::IsCoordinator(buf.get_u8() != 0)
        }
    };
    Some((op_id, response))
}

/// First byte of every response frame: the tag of the request it answers,
/// so the reader task can parse the rest of the body without a separate
/// lookup. Kept distinct from `RequestTag::from_u8` below since the
/// executor side only ever emits tags it was itself sent.
pub fn request_tag_from_u8(b: u8) -> Option<RequestTag> {
    use RequestTag::*;
    Some(match b {
        1 => DaoRequest,
        2 => DaoRedoRequest,
        3 => DaoUndoRequest,
        4 => DaoReundoRequest,
        5 => SendingAddresses,
        6 => SubtreeEntryPoint,
        7 => IsCoordinator,
        _ => return None,
    })
}

pub fn operation_type_from_byte(b: u8) -> Option<OperationType> {
    operation_type_from_u8(b)
}
