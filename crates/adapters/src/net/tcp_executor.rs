// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A TCP-backed `ExecutorClient`: one persistent connection to the
//! external filesystem executor, multiplexing every do/redo/undo/reundo
//! request and pure query over it by `(op_id, request tag)`. A connection
//! failure fails every in-flight request as the conservative outcome
//! (`ExecutionUnsuccessful`/`UndoUnsuccessful`/empty query results) rather
//! than blocking — `ExecutorClient` has no `Result` in its signature, so a
//! bridge failure has to resolve to one of the outcomes the protocol
//! engines already know how to handle: treated as a failed local step,
//! retried by the timeout path.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{error, warn};

use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{PeerAddr, SubtreeEntry};

use super::bridge_protocol::{self, Request, RequestTag, Response};
use crate::executor::{ExecutorClient, ExecutorOutcome};

type PendingKey = (OperationId, RequestTag);

/// Every request round-trips on this single connection under `conn`'s
/// mutex: one in-flight request at a time, read-your-own-response. That
/// serialization is what makes it safe to match a reply against the
/// request that provoked it without a separate correlation table.
pub struct TcpExecutorClient {
    addr: String,
    conn: Mutex<Option<Framed<TcpStream, LengthDelimitedCodec>>>,
}

impl TcpExecutorClient {
    pub fn new(addr: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { addr: addr.into(), conn: Mutex::new(None) })
    }

    async fn ensure_connected(&self) -> std::io::Result<()> {
        let mut guard = self.conn.lock().await;
        if guard.is_some() {
            return Ok(());
        }
        let stream = TcpStream::connect(&self.addr).await?;
        let framed = Framed::new(stream, LengthDelimitedCodec::new());
        *guard = Some(framed);
        Ok(())
    }

    async fn roundtrip(&self, request: Request) -> Option<Response> {
        let key = (request.op_id(), request.tag());

        if self.ensure_connected().await.is_err() {
            warn!(addr = %self.addr, "executor bridge connection failed");
            return None;
        }

        let frame = bridge_protocol::encode_request(&request);
        let mut guard = self.conn.lock().await;
        let Some(framed) = guard.as_mut() else { return None };
        if let Err(err) = framed.send(frame).await {
            *guard = None;
            warn!(addr = %self.addr, error = %err, "executor bridge write failed");
            return None;
        }

        loop {
            let Some(framed) = guard.as_mut() else { return None };
            match framed.next().await {
                Some(Ok(frame)) => match demux(&frame) {
                    Some((frame_key, response)) if frame_key == key => return Some(response),
                    Some((frame_key, _)) => {
                        warn!(addr = %self.addr, ?frame_key, "dropping a bridge reply for a different in-flight request");
                    }
                    None => warn!(addr = %self.addr, "dropping unparsable executor bridge frame"),
                },
                Some(Err(err)) => {
                    *guard = None;
                    error!(addr = %self.addr, error = %err, "executor bridge read failed");
                    return None;
                }
                None => {
                    *guard = None;
                    warn!(addr = %self.addr, "executor bridge connection closed");
                    return None;
                }
            }
        }
    }
}

fn demux(frame: &[u8]) -> Option<(PendingKey, Response)> {
    if frame.is_empty() {
        return None;
    }
    let tag = bridge_protocol::request_tag_from_u8(frame[0])?;
    let (op_id, response) = bridge_protocol::decode_response(tag, &frame[1..])?;
    Some(((op_id, tag), response))
}

#[async_trait]
impl ExecutorClient for TcpExecutorClient {
    async fn do_request(&self, op_id: OperationId, operation_type: OperationType, blob: &[u8]) -> ExecutorOutcome {
        let req = Request::Do { op_id, operation_type, blob: bytes::Bytes::copy_from_slice(blob) };
        match self.roundtrip(req).await {
            Some(Response::ExecutionSuccessful { next_participant }) => ExecutorOutcome::ExecutionSuccessful { next_participant },
            _ => ExecutorOutcome::ExecutionUnsuccessful,
        }
    }

    async fn redo_request(&self, op_id: OperationId, operation_type: OperationType, blob: &[u8]) -> ExecutorOutcome {
        let req = Request::Redo { op_id, operation_type, blob: bytes::Bytes::copy_from_slice(blob) };
        match self.roundtrip(req).await {
            Some(Response::ExecutionSuccessful { next_participant }) => ExecutorOutcome::ExecutionSuccessful { next_participant },
            _ => ExecutorOutcome::ExecutionUnsuccessful,
        }
    }

    async fn undo_request(&self, op_id: OperationId, operation_type: OperationType, blob: &[u8]) -> ExecutorOutcome {
        let req = Request::Undo { op_id, operation_type, blob: bytes::Bytes::copy_from_slice(blob) };
        match self.roundtrip(req).await {
            Some(Response::UndoSuccessful) => ExecutorOutcome::UndoSuccessful,
            _ => ExecutorOutcome::UndoUnsuccessful,
        }
    }

    async fn reundo_request(&self, op_id: OperationId, operation_type: OperationType, blob: &[u8]) -> ExecutorOutcome {
        let req = Request::Reundo { op_id, operation_type, blob: bytes::Bytes::copy_from_slice(blob) };
        match self.roundtrip(req).await {
            Some(Response::UndoSuccessful) => ExecutorOutcome::UndoSuccessful,
            _ => ExecutorOutcome::UndoUnsuccessful,
        }
    }

    async fn set_sending_addresses(&self, op_id: OperationId) -> Vec<PeerAddr> {
        match self.roundtrip(Request::SendingAddresses { op_id }).await {
            Some(Response::SendingAddresses(addrs)) => addrs,
            _ => Vec::new(),
        }
    }

    async fn set_subtree_entry_point(&self, op_id: OperationId) -> Option<SubtreeEntry> {
        match self.roundtrip(Request::SubtreeEntryPoint { op_id }).await {
            Some(Response::SubtreeEntryPoint(entry)) => entry,
            _ => None,
        }
    }

    async fn is_coordinator(&self, op_id: OperationId) -> bool {
        matches!(self.roundtrip(Request::IsCoordinator { op_id }).await, Some(Response::IsCoordinator(true)))
    }
}
