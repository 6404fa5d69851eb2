// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered Operation Execution: a pipelined chain where
//! each node executes its own part and hands off to the next, discovered
//! lazily per hop via `ExecutorOutcome::ExecutionSuccessful::next_participant`
//! rather than a static participant list (spec.md §3: "empty on the
//! first [hop]").
//!
//! Every non-first node's single `participants` entry is the peer the
//! inbound `OoeOpReq` was received from — the wire carries no separate
//! "predecessor subtree" distinct from `initiator_subtree`, so that is the
//! only address available to reply to regardless of hop position; see
//! DESIGN.md for why this collapses the spec's textual "predecessor vs.
//! initiator" distinction into one thing in practice.

use tracing::warn;

use dao_adapters::executor::ExecutorOutcome;
use dao_core::clock::Clock;
use dao_core::log_marker::LogMarker;
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::protocol::ProtocolKind;
use dao_core::status::Status;
use dao_core::subtree::{PeerAddr, Subtree, SubtreeEntry};
use dao_wire::Event;

use crate::client_result::ClientResult;
use crate::dao::{Dao, EngineState};
use crate::error::EngineError;
use crate::protocol::common::{handle_unsuccessful_protocol_step, send_one};

/// `start_coordinator` for `participants.len() == 0`: the
/// first hop of an OOE chain.
pub(crate) async fn start_coordinator_first_hop<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    op_id: OperationId,
    operation_type: OperationType,
    blob: Vec<u8>,
    subtree_entry: SubtreeEntry,
) -> Result<(), EngineError> {
    let journal_key = dao.journal_key_for(operation_type, subtree_entry);
    dao.journal.append_begin(journal_key, op_id, operation_type, blob.clone()).await.map_err(|e| EngineError::Journal(op_id, e))?;

    let outcome = dao.executor.do_request(op_id, operation_type, &blob).await;
    match outcome {
        ExecutorOutcome::ExecutionSuccessful { next_participant: Some(next_entry) } => {
            advance_to_next_hop(dao, state, op_id, operation_type, journal_key, blob, subtree_entry, true, Vec::new(), next_entry).await
        }
        ExecutorOutcome::ExecutionSuccessful { next_participant: None } => {
            dao.journal.append_commit(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
            dao.emit_client_result(ClientResult::new(op_id, ProtocolKind::Ooe, operation_type, true)).await;
            Ok(())
        }
        _ => {
            dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
            dao.emit_client_result(ClientResult::new(op_id, ProtocolKind::Ooe, operation_type, false)).await;
            Ok(())
        }
    }
}

/// Inbound `OoeOpReq` at an intermediate or last node.
pub(crate) async fn start_participant<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    sender: PeerAddr,
    op_id: OperationId,
    operation_type: OperationType,
    self_subtree: SubtreeEntry,
    initiator_subtree: SubtreeEntry,
    blob: Vec<u8>,
) -> Result<(), EngineError> {
    let journal_key = dao.journal_key_for(operation_type, self_subtree);
    dao.journal.append_begin(journal_key, op_id, operation_type, blob.clone()).await.map_err(|e| EngineError::Journal(op_id, e))?;
    let predecessor = Subtree::new(sender, initiator_subtree);

    let outcome = dao.executor.do_request(op_id, operation_type, &blob).await;
    match outcome {
        ExecutorOutcome::ExecutionSuccessful { next_participant: Some(next_entry) } => {
            advance_to_next_hop(dao, state, op_id, operation_type, journal_key, blob, initiator_subtree, false, vec![predecessor], next_entry).await
        }
        ExecutorOutcome::ExecutionSuccessful { next_participant: None } => {
            dao.journal.append_commit(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
            if let Err(err) = send_one(dao, &predecessor.server_address, Event::OoeAck { op_id }).await {
                handle_unsuccessful_protocol_step(op_id, &err);
            }
            Ok(())
        }
        _ => {
            dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
            if let Err(err) = send_one(dao, &predecessor.server_address, Event::OoeAborted { op_id }).await {
                handle_unsuccessful_protocol_step(op_id, &err);
            }
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn advance_to_next_hop<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    op_id: OperationId,
    operation_type: OperationType,
    journal_key: SubtreeEntry,
    blob: Vec<u8>,
    initiator_subtree: SubtreeEntry,
    is_coordinator: bool,
    participants: Vec<Subtree>,
    next_entry: SubtreeEntry,
) -> Result<(), EngineError> {
    dao.journal.append_update(journal_key, op_id, LogMarker::OoeStartNext).await.map_err(|e| EngineError::Journal(op_id, e))?;
    let next_peer = match dao.mlt.owner_of(next_entry).await {
        Ok(peer) => peer,
        Err(err) => {
            warn!(%op_id, %next_entry, error = %err, "ooe next hop owner unresolved, leaving for timeout retry");
            let op = dao.build_op_state(op_id, operation_type, blob, ProtocolKind::Ooe, Status::OoeWaitResult, is_coordinator, participants, journal_key)?;
            state.store.insert(op);
            dao.schedule_timeout(state, op_id, Status::OoeWaitResult, dao.config.ooe_rel_timeout());
            return Ok(());
        }
    };
    let event = Event::OoeOpReq { op_id, operation_type, self_subtree: next_entry, initiator_subtree, blob: blob.clone() };
    let op = dao.build_op_state(op_id, operation_type, blob, ProtocolKind::Ooe, Status::OoeWaitResult, is_coordinator, participants, journal_key)?;
    state.store.insert(op);
    dao.schedule_timeout(state, op_id, Status::OoeWaitResult, dao.config.ooe_rel_timeout());
    if let Err(err) = send_one(dao, &next_peer, event).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    Ok(())
}

pub(crate) async fn handle_event<C: Clock>(dao: &Dao<C>, state: &mut EngineState, sender: PeerAddr, event: Event) -> Result<(), EngineError> {
    let op_id = event.op_id();
    match event {
        Event::OoeAck { .. } => handle_ack(dao, state, op_id).await,
        Event::OoeAborted { .. } | Event::OoeRAborted { .. } => handle_aborted(dao, state, op_id).await,
        Event::OoeRStatusReq { .. } => resend_to_successor(dao, state, op_id).await,
        other => {
            warn!(%op_id, event = ?other, "event not valid for ooe protocol, re-requesting");
            if let Err(err) = send_one(dao, &sender, Event::EventReRequest { op_id }).await {
                handle_unsuccessful_protocol_step(op_id, &err);
            }
            Ok(())
        }
    }
}

/// Our successor completed its part (spec.md §4.5.3: "the last node
/// acknowledges back along the chain").
async fn handle_ack<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    if op.status != Status::OoeWaitResult {
        return Ok(());
    }
    let journal_key = op.subtree_entry;
    let operation_type = op.operation_type;
    let is_coordinator = op.is_coordinator;
    let predecessor = op.participants.first().cloned();
    dao.journal.append_commit(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
    state.store.remove(op_id);
    if is_coordinator {
        dao.emit_client_result(ClientResult::new(op_id, ProtocolKind::Ooe, operation_type, true)).await;
    } else if let Some(predecessor) = predecessor {
        if let Err(err) = send_one(dao, &predecessor.server_address, Event::OoeAck { op_id }).await {
            handle_unsuccessful_protocol_step(op_id, &err);
        }
    }
    Ok(())
}

/// Our successor aborted (or reported so again); undo our own local
/// mutation, then relay the abort one hop further back (spec.md §4.5.3:
/// "abort anywhere in the chain yields client NACK after undo of any
/// committed moves").
async fn handle_aborted<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    if !matches!(op.status, Status::OoeWaitResult | Status::OoeWaitResultUndone) {
        return Ok(());
    }
    let journal_key = op.subtree_entry;
    let operation_type = op.operation_type;
    let blob = op.operation_blob.clone();
    dao.journal.append_update(journal_key, op_id, LogMarker::OoeUndo).await.map_err(|e| EngineError::Journal(op_id, e))?;
    if let Some(op) = state.store.get_mut(op_id) {
        op.status = Status::OoeWaitResultUndone;
    }
    let undo = dao.executor.undo_request(op_id, operation_type, &blob).await;
    finish_abort(dao, state, op_id, journal_key, operation_type, undo).await
}

async fn finish_abort<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    op_id: OperationId,
    journal_key: SubtreeEntry,
    operation_type: OperationType,
    undo: ExecutorOutcome,
) -> Result<(), EngineError> {
    if !matches!(undo, ExecutorOutcome::UndoSuccessful) {
        warn!(%op_id, "ooe undo failed, leaving WaitResultUndone for the timeout path to re-request");
        return Ok(());
    }
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    let is_coordinator = op.is_coordinator;
    let predecessor = op.participants.first().cloned();
    dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
    state.store.remove(op_id);
    if is_coordinator {
        dao.emit_client_result(ClientResult::new(op_id, ProtocolKind::Ooe, operation_type, false)).await;
    } else if let Some(predecessor) = predecessor {
        if let Err(err) = send_one(dao, &predecessor.server_address, Event::OoeAborted { op_id }).await {
            handle_unsuccessful_protocol_step(op_id, &err);
        }
    }
    Ok(())
}

/// Re-resolve and nudge our own successor (spec.md §4.6 `OOEWaitResult`:
/// "send `OOERStatusReq`"; also used to answer an inbound `OoeRStatusReq`
/// from our predecessor, which is asking us to make progress, not us to
/// answer for ourselves — our own last sent message was the `OoeOpReq` our
/// successor hasn't answered yet).
async fn resend_to_successor<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    if !matches!(state.store.get(op_id), Some(op) if op.status == Status::OoeWaitResult) {
        return Ok(());
    }
    let addresses = dao.executor.set_sending_addresses(op_id).await;
    let Some(successor) = addresses.into_iter().next() else { return Ok(()) };
    if let Err(err) = send_one(dao, &successor, Event::OoeRStatusReq { op_id }).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    Ok(())
}

/// Timeout firing for an OOE status.
pub(crate) async fn handle_timeout<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId, status: Status) -> Result<(), EngineError> {
    match status {
        Status::OoeComp => {
            // Unreachable under this crate's synchronous executor call
            // (see DESIGN.md); kept for recovery-reconstructed operations.
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let journal_key = op.subtree_entry;
            let operation_type = op.operation_type;
            let is_coordinator = op.is_coordinator;
            let predecessor = op.participants.first().cloned();
            dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
            state.store.remove(op_id);
            if is_coordinator {
                dao.emit_client_result(ClientResult::new(op_id, ProtocolKind::Ooe, operation_type, false)).await;
            } else if let Some(predecessor) = predecessor {
                if let Err(err) = send_one(dao, &predecessor.server_address, Event::OoeAborted { op_id }).await {
                    handle_unsuccessful_protocol_step(op_id, &err);
                }
            }
            Ok(())
        }
        Status::OoeWaitResult => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            if dao.clock.now() >= op.overall_deadline {
                return handle_aborted(dao, state, op_id).await;
            }
            resend_to_successor(dao, state, op_id).await?;
            dao.schedule_timeout(state, op_id, Status::OoeWaitResult, dao.config.ooe_rel_timeout());
            Ok(())
        }
        Status::OoeWaitResultUndone => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let (operation_type, blob, journal_key) = (op.operation_type, op.operation_blob.clone(), op.subtree_entry);
            let outcome = dao.executor.reundo_request(op_id, operation_type, &blob).await;
            finish_abort(dao, state, op_id, journal_key, operation_type, outcome).await
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "ooe_tests.rs"]
mod tests;
