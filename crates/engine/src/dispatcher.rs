// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Dispatcher: the single serialization point for all
//! protocol activity on this server. Every inbound peer event and every
//! locally-started operation funnels through [`dispatch_peer_event`],
//! which holds the coarse `Dao::state` lock for the full 8-step sequence
//! named there.

use tracing::warn;

use dao_core::clock::Clock;
use dao_core::operation_id::OperationId;
use dao_core::status::Status;
use dao_core::subtree::PeerAddr;
use dao_wire::Event;

use crate::dao::{Dao, EngineState};
use crate::error::EngineError;
use crate::recovery::{reconstruct_on_demand, OnDemandOutcome};

/// Dispatch one inbound peer event.
///
/// `sender` is the peer address the event arrived from — required for
/// step 6's participant-ownership check and for rewriting `NotResponsible`
/// into an MLT update.
pub async fn dispatch_peer_event<C: Clock>(dao: &Dao<C>, sender: PeerAddr, event: Event) -> Result<(), EngineError> {
    // Step 1: drop everything until the startup journal scan completes.
    if !dao.is_recovery_complete() {
        warn!(op_id = %event.op_id(), "dropping inbound event, recovery not complete");
        return Ok(());
    }

    // Step 2: only "normal" messages are accepted; reply-correlated
    // traffic at the transport layer never reaches this far in this
    // codec (`Event::is_reply_correlated` is always false), but the
    // check is kept explicit so a future codec change can't silently
    // smuggle correlated replies past the Dispatcher.
    if event.is_reply_correlated() {
        warn!(op_id = %event.op_id(), "dropping reply-correlated event");
        return Ok(());
    }

    // Step 3: acquire the single global mutex for the rest of this
    // event's handling.
    let mut guard = dao.state.lock().await;
    let op_id = event.op_id();

    // Step 4: look up the OpState, falling back to on-demand recovery.
    if !guard.store.contains(op_id) {
        match reconstruct_on_demand(dao, &mut guard, op_id).await? {
            OnDemandOutcome::Reconstructed => {}
            OnDemandOutcome::NoBeginLog => {
                // No journal anywhere has ever seen this id: for an
                // operation-request event this is not an unknown
                // operation at all, it is this server's first notice of
                // a brand new one it participates in (spec.md §4.5.1/
                // §4.5.2/§4.5.3 "Inbound TPCOpReq/MTPCOpReq/OOEOpReq").
                // Everything else genuinely has no record and gets the
                // `NotResponsible` treatment.
                if start_participant_from_op_req(dao, &mut guard, sender.clone(), event.clone()).await?.is_some() {
                    return Ok(());
                }
                handle_unknown_operation(dao, &mut guard, sender, op_id, &event).await?;
                return Ok(());
            }
            OnDemandOutcome::Finished { committed } => {
                reply_closing_message(dao, &sender, op_id, &event, committed).await;
                return Ok(());
            }
        }
    }

    // Step 5: auxiliary failure messages bypass protocol advancement.
    if is_auxiliary(&event) {
        handle_auxiliary(dao, &mut guard, sender, event).await?;
        return Ok(());
    }

    let (protocol, status, is_op_req) = {
        let Some(op) = guard.store.get(op_id) else {
            warn!(%op_id, "operation vanished between presence check and lookup");
            return Ok(());
        };
        (op.protocol, op.status, matches!(event, Event::TpcOpReq { .. } | Event::MtpcOpReq { .. } | Event::OoeOpReq { .. }))
    };

    // Step 6: authorize non-request events against the participant list.
    if !is_op_req && !authorize_sender(dao, &mut guard, op_id, &sender).await {
        dao.transport.send(&sender, Event::NotResponsible { op_id }).await.ok();
        return Ok(());
    }

    // Step 7: reject events that don't match the current status's
    // expected transition; the per-protocol `handle_event` functions
    // already fall through to `reply_rerequest`/equivalent for any event
    // they don't recognize in the current status, so step 7 is enforced
    // inside `route_event` rather than duplicated here.
    let _ = status;

    // Step 8: hand off to the owning protocol engine.
    crate::protocol::route_event(dao, &mut guard, sender, protocol, event).await
}

/// Step 4 special case:
/// route a brand new operation-request event to the owning protocol's
/// `start_participant`, which appends the begin record and asks the
/// executor to run locally. Returns `None` for any other event, so the
/// caller falls through to the genuine "unknown operation" path.
async fn start_participant_from_op_req<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    sender: PeerAddr,
    event: Event,
) -> Result<Option<()>, EngineError> {
    match event {
        Event::TpcOpReq { op_id, operation_type, self_subtree, initiator_subtree, blob } => {
            crate::protocol::tpc::start_participant(dao, state, sender, op_id, operation_type, self_subtree, initiator_subtree, blob).await?;
            Ok(Some(()))
        }
        Event::MtpcOpReq { op_id, operation_type, self_subtree, initiator_subtree, blob } => {
            crate::protocol::mtpc::start_participant(dao, state, sender, op_id, operation_type, self_subtree, initiator_subtree, blob).await?;
            Ok(Some(()))
        }
        Event::OoeOpReq { op_id, operation_type, self_subtree, initiator_subtree, blob } => {
            crate::protocol::ooe::start_participant(dao, state, sender, op_id, operation_type, self_subtree, initiator_subtree, blob).await?;
            Ok(Some(()))
        }
        _ => Ok(None),
    }
}

/// No journal has ever seen this id and recovery found nothing: this is
/// the genuine "unknown operation" case spec.md §4.4 step 4 describes,
/// handled as whichever auxiliary failure message fits the event.
async fn handle_unknown_operation<C: Clock>(
    dao: &Dao<C>,
    _state: &mut EngineState,
    sender: PeerAddr,
    op_id: OperationId,
    _event: &Event,
) -> Result<(), EngineError> {
    // No begin record anywhere and no in-memory state: whatever this
    // peer thinks is in flight, this server has no record of it and the
    // conservative reply is the same regardless of which event arrived
    // (an op-request that genuinely never landed is handled by
    // `start_coordinator`/the inbound handler before this path is ever
    // reached, so an unknown id here always means stale peer state).
    dao.transport.send(&sender, Event::NotResponsible { op_id }).await.ok();
    Ok(())
}

/// A retransmitted request for an operation this server already finished
/// and deleted: reply with the terminal acknowledgement the sender's own
/// protocol family expects, inferred from which event it just sent.
async fn reply_closing_message<C: Clock>(dao: &Dao<C>, sender: &PeerAddr, op_id: OperationId, event: &Event, committed: bool) {
    let reply = match event {
        Event::MtpcCommit { .. } | Event::MtpcAbort { .. } | Event::MtpcRCommit { .. } | Event::MtpcRAbort { .. } => Event::MtpcAck { op_id },
        Event::OoeOpReq { .. } | Event::OoeAborted { .. } | Event::OoeRAborted { .. } => {
            if committed {
                Event::OoeAck { op_id }
            } else {
                Event::OoeAborted { op_id }
            }
        }
        _ if committed => Event::TpcAck { op_id },
        _ => Event::TpcAbort { op_id },
    };
    dao.transport.send(sender, reply).await.ok();
}

fn is_auxiliary(event: &Event) -> bool {
    matches!(
        event,
        Event::NotResponsible { .. }
            | Event::EventReRequest { .. }
            | Event::ContentRequest { .. }
            | Event::ContentResponse { .. }
            | Event::StatusRequest { .. }
            | Event::StatusResponse { .. }
    )
}

/// Step 6 authorization: the sender must currently own one of this
/// operation's participant subtrees. If the stored participant list is
/// stale (the owner moved), re-consult the MLT and repair it in place
/// before re-checking, mirroring the `NotResponsible` repair path in
/// `handle_not_responsible`.
async fn authorize_sender<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId, sender: &PeerAddr) -> bool {
    let Some(op) = state.store.get(op_id) else { return false };
    if op.participants.iter().any(|p| &p.server_address == sender) {
        return true;
    }

    // OOE's `participants` entry (when any) is the predecessor, never the
    // successor: the chain's forward edge is not part of `OpState` at all,
    // it is re-resolved per hop through the executor (see `resend_to_successor`
    // in `protocol::ooe`). A waiting node's ack/abort always comes from
    // that successor, so it has to be authorized against the same source.
    if op.protocol == dao_core::protocol::ProtocolKind::Ooe {
        let successors = dao.executor.set_sending_addresses(op_id).await;
        if successors.iter().any(|addr| addr == sender) {
            return true;
        }
    }

    let subtree_inodes: Vec<_> = op.participants.iter().map(|p| p.subtree_entry_inode).collect();
    for inode in subtree_inodes {
        if let Ok(owner) = dao.mlt.owner_of(inode).await {
            if &owner == sender {
                if let Some(op) = state.store.get_mut(op_id) {
                    if let Some(p) = op.participants.iter_mut().find(|p| p.subtree_entry_inode == inode) {
                        p.server_address = owner;
                    }
                }
                return true;
            }
        }
    }
    false
}

/// Step 5: handle an auxiliary failure message without advancing the
/// protocol.
async fn handle_auxiliary<C: Clock>(dao: &Dao<C>, state: &mut EngineState, sender: PeerAddr, event: Event) -> Result<(), EngineError> {
    let op_id = event.op_id();
    match event {
        Event::NotResponsible { op_id } => handle_not_responsible(dao, state, sender, op_id).await,
        Event::EventReRequest { op_id } => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let (protocol, status) = (op.protocol, op.status);
            crate::protocol::route_timeout(dao, state, op_id, protocol, status).await
        }
        Event::ContentRequest { op_id } => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let reply = Event::ContentResponse { op_id, operation_type: op.operation_type, blob: op.operation_blob.clone(), opposite_status: op.status };
            dao.transport.send(&sender, reply).await.ok();
            Ok(())
        }
        Event::StatusRequest { op_id } => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let reply = Event::StatusResponse { op_id, opposite_status: op.status };
            dao.transport.send(&sender, reply).await.ok();
            Ok(())
        }
        Event::ContentResponse { op_id, .. } | Event::StatusResponse { op_id, .. } => {
            // Materializing a brand-new OpState purely from a peer's
            // reply (spec.md §4.4: "combining journal content ... with
            // the response") needs a begin-log on this side to be safe;
            // without one there is nothing durable to resume from, so
            // this server instead asks the peer to re-drive its own
            // side once recovery or a fresh request arrives here.
            warn!(%op_id, "content/status response for an operation with no local begin record, ignoring");
            Ok(())
        }
        other => {
            warn!(%op_id, event = ?other, "non-auxiliary event routed to auxiliary handler");
            Ok(())
        }
    }
}

/// `NotResponsible(op_id)` from peer X (spec.md §4.4 "Failure-handling
/// notes"): reconsult the MLT for X's subtree, repair the participant
/// list if it moved, otherwise treat the silence as the missing reply
/// the current status is waiting on.
async fn handle_not_responsible<C: Clock>(dao: &Dao<C>, state: &mut EngineState, sender: PeerAddr, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    let protocol = op.protocol;
    let status = op.status;

    let stale_entry = op.participants.iter().find(|p| p.server_address == sender).map(|p| p.subtree_entry_inode);
    if let Some(inode) = stale_entry {
        if let Ok(new_owner) = dao.mlt.owner_of(inode).await {
            if new_owner != sender {
                if let Some(op) = state.store.get_mut(op_id) {
                    if let Some(p) = op.participants.iter_mut().find(|p| p.subtree_entry_inode == inode) {
                        p.server_address = new_owner.clone();
                    }
                }
                dao.mlt.record_move(inode, new_owner).await;
                return crate::protocol::route_timeout(dao, state, op_id, protocol, status).await;
            }
        }
    }

    // The sender is still the correct owner and we were waiting on a
    // response it never received: synthesize the equivalent of a
    // negative outcome so the protocol engine can make forward progress
    // rather than waiting out the full timeout again.
    if status == Status::TpcCoordVReqSent {
        return crate::protocol::route_event(dao, state, sender, protocol, Event::TpcVoteNo { op_id }).await;
    }
    crate::protocol::route_timeout(dao, state, op_id, protocol, status).await
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
