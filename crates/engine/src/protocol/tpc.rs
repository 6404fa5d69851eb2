// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-Phase Commit (spec.md §4.5.1, `participants.len() >= 2`).

use tracing::{info, warn};

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
use crate::protocol::common::{handle_unsuccessful_protocol_step, send_each, send_one, send_same};

/// `start_coordinator` for `participants.len() >= 2` (spec.md §4.5.1 step
/// 1). Local execution is requested and awaited before any message is
/// sent to a participant; this collapses the source's "fan out TPCOpReq
/// while local execution runs" concurrency into a strictly sequential
/// local-then-remote order (see DESIGN.md Open Question resolution) —
/// every journal sequence and client ACK/NACK outcome named in spec.md §8
/// is unaffected, since no participant can be told about an operation the
/// coordinator itself has already decided to abort.
pub(crate) async fn start_coordinator<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    op_id: OperationId,
    operation_type: OperationType,
    blob: Vec<u8>,
    participants: Vec<Subtree>,
    subtree_entry: SubtreeEntry,
) -> Result<(), EngineError> {
    let journal_key = dao.journal_key_for(operation_type, subtree_entry);
    dao.journal.append_begin(journal_key, op_id, operation_type, blob.clone()).await.map_err(|e| EngineError::Journal(op_id, e))?;

    let outcome = dao.executor.do_request(op_id, operation_type, &blob).await;
    if !matches!(outcome, ExecutorOutcome::ExecutionSuccessful { .. }) {
        info!(%op_id, "tpc coordinator local execution failed, aborting before contacting participants");
        dao.journal.append_update(journal_key, op_id, LogMarker::TpcIAborting).await.map_err(|e| EngineError::Journal(op_id, e))?;
        dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
        dao.emit_client_result(ClientResult::new(op_id, ProtocolKind::Tpc, operation_type, false)).await;
        return Ok(());
    }

    dao.journal.append_update(journal_key, op_id, LogMarker::TpcIVoteStart).await.map_err(|e| EngineError::Journal(op_id, e))?;

    let op_reqs: Vec<(PeerAddr, Event)> = participants
        .iter()
        .map(|p| {
            (
                p.server_address.clone(),
                Event::TpcOpReq { op_id, operation_type, self_subtree: p.subtree_entry_inode, initiator_subtree: subtree_entry, blob: blob.clone() },
            )
        })
        .collect();

    let mut op = dao.build_op_state(op_id, operation_type, blob, ProtocolKind::Tpc, Status::TpcCoordVReqSent, true, participants.clone(), journal_key)?;
    op.received_votes = participants.len();
    state.store.insert(op);
    dao.schedule_timeout(state, op_id, Status::TpcCoordVReqSent, dao.config.tpc_rel_timeout());
    if let Err(err) = send_each(dao, &op_reqs).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    let receivers: Vec<PeerAddr> = participants.iter().map(|p| p.server_address.clone()).collect();
    if let Err(err) = send_same(dao, &receivers, Event::TpcVoteReq { op_id }).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    Ok(())
}

/// Inbound `TpcOpReq`, from a peer who is coordinating a new operation
/// this server participates in.
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
    let (marker, status) = if matches!(outcome, ExecutorOutcome::ExecutionSuccessful { .. }) {
        (LogMarker::TpcPVoteYes, Status::TpcPartWaitVReqYes)
    } else {
        (LogMarker::TpcPVoteNo, Status::TpcPartWaitVReqNo)
    };
    dao.journal.append_update(journal_key, op_id, marker).await.map_err(|e| EngineError::Journal(op_id, e))?;
    let op = dao.build_op_state(op_id, operation_type, blob, ProtocolKind::Tpc, status, false, vec![coordinator], journal_key)?;
    state.store.insert(op);
    Ok(())
}

/// Dispatch a TPC protocol event against an already-in-store operation
///. `sender` has already been authorized by
/// the dispatcher to own one of `participants`.
pub(crate) async fn handle_event<C: Clock>(dao: &Dao<C>, state: &mut EngineState, sender: PeerAddr, event: Event) -> Result<(), EngineError> {
    let op_id = event.op_id();
    match event {
        Event::TpcVoteReq { .. } => handle_vote_req(dao, state, op_id).await,
        Event::TpcVoteYes { .. } => handle_vote(dao, state, sender, op_id, true).await,
        Event::TpcVoteNo { .. } => handle_vote(dao, state, sender, op_id, false).await,
        Event::TpcCommit { .. } => handle_commit(dao, state, op_id).await,
        Event::TpcAbort { .. } => handle_abort(dao, state, op_id).await,
        Event::TpcAck { .. } => handle_ack(dao, state, sender, op_id).await,
        Event::TpcRVoteReq { .. } => handle_vote_req(dao, state, op_id).await,
        Event::TpcRCommit { .. } => handle_commit(dao, state, op_id).await,
        Event::TpcPrAbort { .. } => handle_abort(dao, state, op_id).await,
        Event::TpcRVoteY { .. } => handle_vote(dao, state, sender, op_id, true).await,
        Event::TpcRVoteN { .. } => handle_vote(dao, state, sender, op_id, false).await,
        other => {
            warn!(%op_id, event = ?other, "event not valid for tpc protocol, re-requesting");
            reply_rerequest(dao, &sender, op_id).await
        }
    }
}

async fn reply_rerequest<C: Clock>(dao: &Dao<C>, sender: &PeerAddr, op_id: OperationId) -> Result<(), EngineError> {
    if let Err(err) = send_one(dao, sender, Event::EventReRequest { op_id }).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    Ok(())
}

/// Participant side: a coordinator asking for the stored vote (spec.md
/// §4.5.1 step 2, happy path after `TpcPartWaitVReqYes`/`No`; also the
/// retry variant `TpcRVoteReq`).
async fn handle_vote_req<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get_mut(op_id) else { return Ok(()) };
    let coordinator = op.participants.first().cloned();
    let Some(coordinator) = coordinator else { return Ok(()) };
    let (event, next_status) = match op.status {
        Status::TpcPartWaitVReqYes => (Event::TpcVoteYes { op_id }, Status::TpcPartWaitVResultExpectYes),
        Status::TpcPartWaitVReqNo => (Event::TpcVoteNo { op_id }, Status::TpcPartWaitVResultExpectNo),
        Status::TpcPartWaitVResultExpectYes => (Event::TpcVoteYes { op_id }, Status::TpcPartWaitVResultExpectYes),
        Status::TpcPartWaitVResultExpectNo => (Event::TpcVoteNo { op_id }, Status::TpcPartWaitVResultExpectNo),
        // Local execution hasn't finished yet (only reachable via recovery
        // reconstruction under this crate's synchronous executor calls;
        // see DESIGN.md). Nothing to vote with yet.
        Status::TpcPartComp => return Ok(()),
        _ => return Ok(()),
    };
    op.status = next_status;
    if let Err(err) = send_one(dao, &coordinator.server_address, event).await {
        handle_unsuccessful_protocol_step(op_id, &err);
        return Ok(());
    }
    dao.schedule_timeout(state, op_id, next_status, dao.config.tpc_rel_timeout());
    Ok(())
}

/// Coordinator side: tally one vote (spec.md §4.5.1 step 3; dedup per
/// spec.md §4.2/§8 "at most one vote is counted ... regardless of
/// retransmission count").
async fn handle_vote<C: Clock>(dao: &Dao<C>, state: &mut EngineState, sender: PeerAddr, op_id: OperationId, yes: bool) -> Result<(), EngineError> {
    if !state.store.try_record_vote(op_id, &sender) {
        // Duplicate vote. If we've already moved past the vote phase,
        // resend whatever the peer is currently owed.
        if let Some(op) = state.store.get(op_id) {
            if op.status.is_tpc_abort_branch() {
                if let Err(err) = send_one(dao, &sender, Event::TpcAbort { op_id }).await {
                    handle_unsuccessful_protocol_step(op_id, &err);
                }
            }
        }
        return Ok(());
    }
    {
        let Some(op) = state.store.get(op_id) else { return Ok(()) };
        if op.status != Status::TpcCoordVReqSent {
            return Ok(());
        }
    }
    if !yes {
        return decide_abort(dao, state, op_id).await;
    }
    let all_in = {
        let Some(op) = state.store.get_mut(op_id) else { return Ok(()) };
        op.received_votes = op.received_votes.saturating_sub(1);
        op.received_votes == 0
    };
    if all_in {
        decide_commit(dao, state, op_id).await?;
    }
    Ok(())
}

async fn decide_commit<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    let journal_key = op.subtree_entry;
    let operation_type = op.operation_type;
    let protocol = op.protocol;
    let participants: Vec<PeerAddr> = op.participants.iter().map(|p| p.server_address.clone()).collect();
    dao.journal.append_update(journal_key, op_id, LogMarker::TpcICommitting).await.map_err(|e| EngineError::Journal(op_id, e))?;

    state.store.drop_votes_for(op_id);
    if let Some(op) = state.store.get_mut(op_id) {
        op.status = Status::TpcCoordVResultSent;
        op.received_votes = participants.len();
    }
    dao.emit_client_result(ClientResult::new(op_id, protocol, operation_type, true)).await;
    if let Err(err) = send_same(dao, &participants, Event::TpcCommit { op_id }).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    dao.schedule_timeout(state, op_id, Status::TpcCoordVResultSent, dao.config.tpc_rel_timeout());
    Ok(())
}

/// First negative vote (or negative local executor result) aborts the
/// whole operation.
async fn decide_abort<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    let journal_key = op.subtree_entry;
    let operation_type = op.operation_type;
    let protocol = op.protocol;
    let participants: Vec<PeerAddr> = op.participants.iter().map(|p| p.server_address.clone()).collect();
    let blob = op.operation_blob.clone();
    dao.journal.append_update(journal_key, op_id, LogMarker::TpcIAborting).await.map_err(|e| EngineError::Journal(op_id, e))?;

    if operation_type.requires_undo() {
        if let Some(op) = state.store.get_mut(op_id) {
            op.status = Status::TpcWaitUndoAck;
        }
        let undo = dao.executor.undo_request(op_id, operation_type, &blob).await;
        finish_coordinator_undo(dao, state, op_id, journal_key, operation_type, protocol, participants, undo).await?;
        return Ok(());
    }

    state.store.drop_votes_for(op_id);
    if let Some(op) = state.store.get_mut(op_id) {
        op.status = Status::TpcAborting;
        op.received_votes = participants.len();
    }
    dao.emit_client_result(ClientResult::new(op_id, protocol, operation_type, false)).await;
    if let Err(err) = send_same(dao, &participants, Event::TpcAbort { op_id }).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    dao.schedule_timeout(state, op_id, Status::TpcAborting, dao.config.tpc_rel_timeout());
    Ok(())
}

async fn finish_coordinator_undo<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    op_id: OperationId,
    journal_key: SubtreeEntry,
    operation_type: OperationType,
    protocol: ProtocolKind,
    participants: Vec<PeerAddr>,
    undo: ExecutorOutcome,
) -> Result<(), EngineError> {
    if !matches!(undo, ExecutorOutcome::UndoSuccessful) {
        warn!(%op_id, "coordinator undo failed, leaving WaitUndoAck for the timeout path to re-request");
        return Ok(());
    }
    dao.journal.append_update(journal_key, op_id, LogMarker::TpcIAborting).await.map_err(|e| EngineError::Journal(op_id, e))?;
    state.store.drop_votes_for(op_id);
    if let Some(op) = state.store.get_mut(op_id) {
        op.status = Status::TpcWaitUndoToFinish;
        op.received_votes = participants.len();
    }
    dao.emit_client_result(ClientResult::new(op_id, protocol, operation_type, false)).await;
    if let Err(err) = send_same(dao, &participants, Event::TpcAbort { op_id }).await {
        handle_unsuccessful_protocol_step(op_id, &err);
    }
    dao.schedule_timeout(state, op_id, Status::TpcWaitUndoToFinish, dao.config.tpc_rel_timeout());
    Ok(())
}

/// Participant side: coordinator decided commit.
async fn handle_commit<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    let journal_key = op.subtree_entry;
    let coordinator = op.participants.first().cloned();
    dao.journal.append_commit(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
    state.store.remove(op_id);
    if let Some(coordinator) = coordinator {
        if let Err(err) = send_one(dao, &coordinator.server_address, Event::TpcAck { op_id }).await {
            handle_unsuccessful_protocol_step(op_id, &err);
        }
    }
    Ok(())
}

/// Participant side: coordinator decided abort.
/// Subtree-move-family types request undo before acking.
async fn handle_abort<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId) -> Result<(), EngineError> {
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    let journal_key = op.subtree_entry;
    let operation_type = op.operation_type;
    let coordinator = op.participants.first().cloned();
    let blob = op.operation_blob.clone();

    if operation_type.requires_undo() {
        if let Some(op) = state.store.get_mut(op_id) {
            op.status = Status::TpcWaitUndoToFinish;
        }
        let undo = dao.executor.undo_request(op_id, operation_type, &blob).await;
        if !matches!(undo, ExecutorOutcome::UndoSuccessful) {
            warn!(%op_id, "participant undo failed, leaving WaitUndoToFinish for the timeout path to re-request");
            return Ok(());
        }
    }
    dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
    state.store.remove(op_id);
    if let Some(coordinator) = coordinator {
        if let Err(err) = send_one(dao, &coordinator.server_address, Event::TpcAck { op_id }).await {
            handle_unsuccessful_protocol_step(op_id, &err);
        }
    }
    Ok(())
}

/// Coordinator side: collect one `TpcAck` (spec.md §4.5.1 step 5, dedup
/// reused identically to vote tallying).
async fn handle_ack<C: Clock>(dao: &Dao<C>, state: &mut EngineState, sender: PeerAddr, op_id: OperationId) -> Result<(), EngineError> {
    if !state.store.try_record_vote(op_id, &sender) {
        return Ok(());
    }
    let all_in = {
        let Some(op) = state.store.get_mut(op_id) else { return Ok(()) };
        op.received_votes = op.received_votes.saturating_sub(1);
        op.received_votes == 0
    };
    if !all_in {
        return Ok(());
    }
    let Some(op) = state.store.get(op_id) else { return Ok(()) };
    let journal_key = op.subtree_entry;
    let committed = op.status == Status::TpcCoordVResultSent;
    if committed {
        dao.journal.append_commit(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
    } else {
        dao.journal.append_abort(journal_key, op_id).await.map_err(|e| EngineError::Journal(op_id, e))?;
    }
    state.store.remove(op_id);
    Ok(())
}

/// Timeout firing for a TPC status.
pub(crate) async fn handle_timeout<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId, status: Status) -> Result<(), EngineError> {
    match status {
        Status::TpcCoordComp => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            if dao.clock.now() >= op.overall_deadline {
                decide_abort(dao, state, op_id).await
            } else {
                let (operation_type, blob) = (op.operation_type, op.operation_blob.clone());
                dao.executor.redo_request(op_id, operation_type, &blob).await;
                Ok(())
            }
        }
        Status::TpcCoordVReqSent => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            if dao.clock.now() >= op.overall_deadline {
                return decide_abort(dao, state, op_id).await;
            }
            let participants: Vec<PeerAddr> = op.participants.iter().map(|p| p.server_address.clone()).collect();
            if let Err(err) = send_same(dao, &participants, Event::TpcRVoteReq { op_id }).await {
                handle_unsuccessful_protocol_step(op_id, &err);
            }
            dao.schedule_timeout(state, op_id, Status::TpcCoordVReqSent, dao.config.tpc_rel_timeout());
            Ok(())
        }
        Status::TpcPartWaitVResultExpectYes | Status::TpcPartWaitVResultExpectNo => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let coordinator = op.participants.first().cloned();
            let event = if status == Status::TpcPartWaitVResultExpectYes { Event::TpcVoteYes { op_id } } else { Event::TpcVoteNo { op_id } };
            if let Some(coordinator) = coordinator {
                if let Err(err) = send_one(dao, &coordinator.server_address, event).await {
                    handle_unsuccessful_protocol_step(op_id, &err);
                }
            }
            dao.schedule_timeout(state, op_id, status, dao.config.tpc_rel_timeout());
            Ok(())
        }
        Status::TpcPartVReqRec => {
            // Safety: cannot finish locally within the per-step timeout;
            // must not block the coordinator.
            let Some(op) = state.store.get_mut(op_id) else { return Ok(()) };
            op.status = Status::TpcPartWaitVReqNo;
            handle_vote_req(dao, state, op_id).await
        }
        Status::TpcCoordVResultSent => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let participants: Vec<PeerAddr> = op.participants.iter().map(|p| p.server_address.clone()).collect();
            if let Err(err) = send_same(dao, &participants, Event::TpcRCommit { op_id }).await {
                handle_unsuccessful_protocol_step(op_id, &err);
            }
            dao.schedule_timeout(state, op_id, Status::TpcCoordVResultSent, dao.config.tpc_rel_timeout());
            Ok(())
        }
        Status::TpcWaitUndoAck => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let (operation_type, blob) = (op.operation_type, op.operation_blob.clone());
            let outcome = dao.executor.reundo_request(op_id, operation_type, &blob).await;
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let journal_key = op.subtree_entry;
            let protocol = op.protocol;
            let participants: Vec<PeerAddr> = op.participants.iter().map(|p| p.server_address.clone()).collect();
            finish_coordinator_undo(dao, state, op_id, journal_key, operation_type, protocol, participants, outcome).await
        }
        Status::TpcWaitUndoToFinish => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let participants: Vec<PeerAddr> = op.participants.iter().map(|p| p.server_address.clone()).collect();
            if let Err(err) = send_same(dao, &participants, Event::TpcAbort { op_id }).await {
                handle_unsuccessful_protocol_step(op_id, &err);
            }
            dao.schedule_timeout(state, op_id, Status::TpcWaitUndoToFinish, dao.config.tpc_rel_timeout());
            Ok(())
        }
        Status::TpcAborting => {
            let Some(op) = state.store.get(op_id) else { return Ok(()) };
            let participants: Vec<PeerAddr> = op.participants.iter().map(|p| p.server_address.clone()).collect();
            if let Err(err) = send_same(dao, &participants, Event::TpcAbort { op_id }).await {
                handle_unsuccessful_protocol_step(op_id, &err);
            }
            dao.schedule_timeout(state, op_id, Status::TpcAborting, dao.config.tpc_rel_timeout());
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "tpc_tests.rs"]
mod tests;
