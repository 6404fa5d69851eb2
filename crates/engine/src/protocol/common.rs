// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound message plumbing shared by the three protocol engines
//!.

use dao_adapters::error::TransportError;
use dao_core::clock::Clock;
use dao_core::operation_id::OperationId;
use dao_core::subtree::PeerAddr;
use dao_wire::Event;
use tracing::warn;

use crate::dao::Dao;
use crate::error::{SendError, SendKind};

fn send_kind(err: &TransportError) -> SendKind {
    match err {
        TransportError::SocketNotFound(_) => SendKind::SocketNotFound,
        TransportError::SendFailed(..) => SendKind::SendFailed,
    }
}

/// `send_simple(op_id, tag, receivers)` from spec.md §4.5: wraps sending
/// one event per receiver, stopping at the first failure and reporting
/// which receiver (by index) failed rather than smuggling an errno
///. Events may differ per receiver (e.g. each
/// `TpcOpReq` carries that receiver's own `self_subtree`).
pub(crate) async fn send_each<C: Clock>(dao: &Dao<C>, items: &[(PeerAddr, Event)]) -> Result<(), SendError> {
    for (which_receiver, (to, event)) in items.iter().enumerate() {
        dao.transport
            .send(to, event.clone())
            .await
            .map_err(|err| SendError { which_receiver, peer: to.clone(), kind: send_kind(&err) })?;
    }
    Ok(())
}

/// Send the identical event to every receiver (spec.md §4.5
/// `send_simple`'s common case: vote requests, commits, aborts, acks).
pub(crate) async fn send_same<C: Clock>(dao: &Dao<C>, receivers: &[PeerAddr], event: Event) -> Result<(), SendError> {
    for (which_receiver, to) in receivers.iter().enumerate() {
        dao.transport
            .send(to, event.clone())
            .await
            .map_err(|err| SendError { which_receiver, peer: to.clone(), kind: send_kind(&err) })?;
    }
    Ok(())
}

pub(crate) async fn send_one<C: Clock>(dao: &Dao<C>, to: &PeerAddr, event: Event) -> Result<(), SendError> {
    dao.transport.send(to, event).await.map_err(|err| SendError { which_receiver: 0, peer: to.clone(), kind: send_kind(&err) })
}

/// `handle_unsuccessful_protocol_step` from spec.md §4.5: on a
/// transient send failure, log and leave the operation in its
/// post-append/pre-send status so the timeout path drives the retry
///. Repairing the socket or
/// participant address happens lazily the next time a send is attempted,
/// through the `Transport`/`MltClient` collaborators themselves — this
/// function's job is only to make the failure non-fatal to the caller.
pub(crate) fn handle_unsuccessful_protocol_step(op_id: OperationId, err: &SendError) {
    warn!(%op_id, which_receiver = err.which_receiver, peer = %err.peer, kind = ?err.kind, "protocol step send failed, leaving operation for timeout retry");
}
