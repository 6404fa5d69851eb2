// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Modified Two-Phase Commit (spec.md §4.5.2, `participants.len() == 1`):
//! no vote phase, the participant answers `MtpcCommit`/`MtpcAbort` directly.

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

/// `start_coordinator` for `participants.len() == 1`.
pub(crate) async fn start_coordinator<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    op_id: OperationId,
    operation_type: OperationType,
    blob: Vec<u8>,
    participant: Subtree,
    subtree_entry: SubtreeEntry,
) -> Result<(), EngineError> {
    let journal_key = dao.journal_key_for(operation_type, subtree_entry);
    dao.journal.append_begin(journal_key, op_id, operation_type, blob.clone()).await.map_err(|e| EngineError::Journal(op_id, e))?;

    let outcome = dao.executor.do_request(op_id, operation_type, &blob).await;
    if !matches!(outcome, ExecutorOutcome::ExecutionSuccessful { .. }) {
        dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
        dao.emit_client_result(ClientResult::new(op_id, ProtocolKind::Mtpc, operation_type, false)).await;
        return Ok(());
    }

    dao.journal.append_update(journal_key, op_id, LogMarker::MtpcIStartP).await.map_err(|e| EngineError::Journal(op_id, e))?;

    let event = Event::MtpcOpReq {
        op_id,
        operation_type,
        self_subtree: participant.subtree_entry_inode,
        initiator_subtree: subtree_entry,
        blob: blob.clone(),
    };
    let op = dao.build_op_state(op_id, operation_type, blob, ProtocolKind::Mtpc, Status::MtpcCoordReqSent, true, vec![participant.clone()], journal_key)?;
    state.store.insert(op);
    dao.schedule_timeout(state, op_id, Status::MtpcCoordReqSent, dao.config.mtpc_rel_timeout());

    if let Err(err) = send_one(dao, &participant.server_address, event).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    Ok(())
}

/// Inbound `MtpcOpReq` (spec.md §4.5.2: "the participant executes and
/// answers `MTPCCommit` or `MTPCAbort` directly, no vote phase").
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
    let outcome = dao.executor.do_request(op_id, operation_type, &blob).await;
    let coordinator = Subtree::new(sender.clone(), initiator_subtree);
    let (marker, status, reply) = if matches!(outcome, ExecutorOutcome::ExecutionSuccessful { .. }) {
        (LogMarker::MtpcPCommit, Status::MtpcPartVoteSendYes, Event::MtpcCommit { op_id })
    } else {
        (LogMarker::MtpcPAbort, Status::MtpcPartVoteSendNo, Event::MtpcAbort { op_id })
    };
    dao.journal.append_update(journal_key, op_id, marker).await.map_err(|e| EngineError::Journal(op_id, e))?;
    let op = dao.build_op_state(op_id, operation_type, blob, ProtocolKind::Mtpc, status, false, vec![coordinator.clone()], journal_key)?;
    state.store.insert(op);
    dao.schedule_timeout(state, op_id, status, dao.config.mtpc_rel_timeout());
    if let Err(err) = send_one(dao, &coordinator.server_address, reply).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    Ok(())
}

pub(crate) async fn handle_event<C: Clock>(dao: &Dao<C>, state: &mut EngineState, sender: PeerAddr, event: Event) -> Result<(), EngineError> {
    let op_id = event.op_id();
    match event {
        Event::MtpcCommit { .. } => handle_participant_vote(dao, state, op_id, true).await,
        Event::MtpcAbort { .. } | Event::MtpcRAbort { .. } => handle_participant_vote(dao, state, op_id, false).await,
        Event::MtpcAck { .. } => handle_ack(dao, state, op_id).await,
        Event::MtpcRCommit { .. } => handle_participant_vote(dao, state, op_id, true).await,
        Event::MtpcRStatusReq { .. } => resend_status(dao, state, op_id).await,
        other => {
            warn!(%op_id, event = ?other, "event not valid for mtpc protocol, re-requesting");
            if let Err(err) = send_one(dao, &sender, Event::EventReRequest { op_id }).await {
                handle_unsuccessful_protocol_step(op_id, &err);
            }
            Ok(())
        }
    }
}

/// Participant asked the coordinator to resend its last answer (spec.md
/// §4.6 `MTPCCoordinatorReqSend` timeout -> `MTPCRStatusReq`, answered here
/// from the participant side).
async fn resend_status<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    let coordinator = op.participants.first().cloned();
    let event = match op.status {
        Status::MtpcPartVoteSendYes => Event::MtpcCommit { op_id },
        Status::MtpcPartVoteSendNo => Event::MtpcAbort { op_id },
        _ => return Ok(()),
    };
    if let Some(coordinator) = coordinator {
        if let Err(err) = send_one(dao, &coordinator.server_address, event).await {
            handle_unsuccessful_protocol_step(op_id, &err);
        }
    }
    Ok(())
}

/// Coordinator side: the participant's direct commit/abort answer (spec.md
/// §4.5.2, §8 scenario 4).
async fn handle_participant_vote<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId, commit: bool) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    if op.status != Status::MtpcCoordReqSent {
        return Ok(());
    }
    let journal_key = op.subtree_entry;
    let operation_type = op.operation_type;
    let protocol = op.protocol;
    let participant = op.participants.first().cloned();
    let blob = op.operation_blob.clone();

    if commit {
        dao.journal.append_commit(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
        dao.emit_client_result(ClientResult::new(op_id, protocol, operation_type, true)).await;
        reply_ack_and_remove(dao, state, op_id, participant).await;
        return Ok(());
    }

    if operation_type.requires_undo() {
        if let Some(op) = state.store.get_mut(op_id) {
            op.status = Status::MtpcCoordWaitResultUndone;
        }
        let undo = dao.executor.undo_request(op_id, operation_type, &blob).await;
        finish_coordinator_abort(dao, state, op_id, journal_key, operation_type, protocol, participant, undo).await
    } else {
        dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
        dao.emit_client_result(ClientResult::new(op_id, protocol, operation_type, false)).await;
        reply_ack_and_remove(dao, state, op_id, participant).await;
        Ok(())
    }
}

async fn finish_coordinator_abort<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    op_id: OperationId,
    journal_key: SubtreeEntry,
    operation_type: OperationType,
    protocol: ProtocolKind,
    participant: Option<Subtree>,
    undo: ExecutorOutcome,
) -> Result<(), EngineError> {
    if !matches!(undo, ExecutorOutcome::UndoSuccessful) {
        warn!(%op_id, "coordinator undo failed, leaving WaitResultUndone for the timeout path to re-request");
        return Ok(());
    }
    dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
    dao.emit_client_result(ClientResult::new(op_id, protocol, operation_type, false)).await;
    reply_ack_and_remove(dao, state, op_id, participant).await;
    Ok(())
}

async fn reply_ack_and_remove<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId, participant: Option<Subtree>) {
    state.store.remove(op_id);
    if let Some(participant) = participant {
        if let Err(err) = send_one(dao, &participant.server_address, Event::MtpcAck { op_id }).await {
            handle_unsuccessful_protocol_step(op_id, &err);
        }
    }
}

/// Participant side: coordinator's final `MtpcAck` closes out the
/// operation locally.
async fn handle_ack<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    let journal_key = op.subtree_entry;
    let commit = op.status == Status::MtpcPartVoteSendYes;
    if commit {
        dao.journal.append_commit(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
    } else {
        dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
    }
    state.store.remove(op_id);
    Ok(())
}

/// Timeout firing for an MTPC status.
pub(crate) async fn handle_timeout<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId, status: Status) -> Result<(), EngineError> {
    match status {
        Status::MtpcCoordComp => {
            // Unreachable under this crate's synchronous executor call
            // (see DESIGN.md); kept so a recovery-reconstructed operation
            // stuck here still makes forward progress.
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let journal_key = op.subtree_entry;
            let operation_type = op.operation_type;
            let protocol = op.protocol;
            dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
            state.store.remove(op_id);
            dao.emit_client_result(ClientResult::new(op_id, protocol, operation_type, false)).await;
            Ok(())
        }
        Status::MtpcCoordReqSent => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            if dao.clock.now() >= op.overall_deadline {
                let journal_key = op.subtree_entry;
                let operation_type = op.operation_type;
                let protocol = op.protocol;
                dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
                state.store.remove(op_id);
                dao.emit_client_result(ClientResult::new(op_id, protocol, operation_type, false)).await;
                return Ok(());
            }
            let participant = op.participants.first().cloned();
            if let Some(participant) = participant {
                if let Err(err) = send_one(dao, &participant.server_address, Event::MtpcRStatusReq { op_id }).await {
                    handle_unsuccessful_protocol_step(op_id, &err);
                }
            }
            dao.schedule_timeout(state, op_id, Status::MtpcCoordReqSent, dao.config.mtpc_rel_timeout());
            Ok(())
        }
        Status::MtpcPartVoteSendYes | Status::MtpcPartVoteSendNo => {
            resend_status(dao, state, op_id).await?;
            dao.schedule_timeout(state, op_id, status, dao.config.mtpc_rel_timeout());
            Ok(())
        }
        Status::MtpcCoordWaitResultUndone => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let (operation_type, blob) = (op.operation_type, op.operation_blob.clone());
            let outcome = dao.executor.reundo_request(op_id, operation_type, &blob).await;
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let journal_key = op.subtree_entry;
            let protocol = op.protocol;
            let participant = op.participants.first().cloned();
            finish_coordinator_abort(dao, state, op_id, journal_key, operation_type, protocol, participant, outcome).await
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "mtpc_tests.rs"]
mod tests;
