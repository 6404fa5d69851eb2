// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RecoveryManager: rebuilds `OperationStore` entries from
//! journal records, both as a one-shot startup scan and, afterward, on
//! demand when the dispatcher receives an event for an operation id with
//! no in-memory `OpState`.
//!
//! The journal format does not carry a `protocol` field, so
//! reconstruction derives it from `(operation_type, participants.len())`:
//! this crate's operation catalog (`dao_core::operation_type`) reserves
//! `OoeLbTest` exclusively for OOE, so checking that first before falling
//! back to the `participants.len()` rule (`0` → OOE first hop, `1` →
//! MTPC, `2+` → TPC) never misclassifies a TPC/MTPC operation as OOE or
//! vice versa. See DESIGN.md.

use tracing::{info, warn};

use dao_core::clock::Clock;
use dao_core::log_marker::{JournalRecordKind, LogMarker};
use dao_core::op_state::OpState;
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::protocol::ProtocolKind;
use dao_core::status::Status;
use dao_core::subtree::{Subtree, SubtreeEntry};
use dao_storage::{JournalPayload, JournalRecord};

use crate::dao::{Dao, EngineState};
use crate::error::EngineError;

/// Outcome of reconstructing a single operation id on demand (spec.md
/// §4.7 "On demand").
pub(crate) enum OnDemandOutcome {
    /// A begin record was found and an `OpState` was reconstructed and
    /// inserted into the store; the dispatcher should proceed with its
    /// normal authorization/status-check/protocol-handler flow.
    Reconstructed,
    /// No journal has ever seen this id.
    NoBeginLog,
    /// The journal's last record for this id is already terminal.
    Finished { committed: bool },
}

/// Run the startup journal scan and mark
/// recovery complete.
///
/// `known_journals` is every journal key this server currently owns — one
/// per locally-owned subtree. Discovering that list is the process-wiring
/// layer's job: spec.md §4.1 names `enumerate_open(journal_key)` as a
/// per-key operation, not "list every key this journal gateway holds", so
/// the set of keys to scan is a startup input here rather than something
/// `JournalGateway` can answer itself. The server-global journal is always
/// scanned in addition to whatever is passed in.
pub async fn run_startup_recovery<C: Clock>(dao: &Dao<C>, known_journals: &[SubtreeEntry]) -> Result<(), EngineError> {
    let mut guard = dao.state.lock().await;
    let mut keys: Vec<SubtreeEntry> = known_journals.to_vec();
    if !keys.contains(&SubtreeEntry::SERVER_GLOBAL) {
        keys.push(SubtreeEntry::SERVER_GLOBAL);
    }

    let mut recovered = 0usize;
    for journal_key in keys {
        let open_ids = dao.journal.enumerate_open(journal_key).await;
        for op_id in open_ids {
            let Some((found_key, records)) = dao.journal.get_all_records_for(op_id).await else {
                warn!(%op_id, %journal_key, "enumerate_open reported an id with no readable records");
                continue;
            };
            match build_op_state(dao, found_key, &records).await {
                Ok(Some(op)) => {
                    let status = op.status;
                    let protocol = op.protocol;
                    guard.store.insert(op);
                    dao.schedule_timeout(&mut guard, op_id, status, step_timeout(dao, protocol));
                    recovered += 1;
                }
                Ok(None) => warn!(%op_id, %journal_key, "open operation has no begin record to reconstruct from"),
                Err(err) => warn!(%op_id, %journal_key, error = %err, "failed to reconstruct operation during recovery"),
            }
        }
    }
    drop(guard);

    info!(recovered, "recovery scan complete");
    dao.mark_recovery_complete();
    Ok(())
}

/// On-demand reconstruction for an operation id the dispatcher found no
/// in-memory `OpState` for.
pub(crate) async fn reconstruct_on_demand<C: Clock>(
    dao: &Dao<C>,
    state: &mut EngineState,
    op_id: OperationId,
) -> Result<OnDemandOutcome, EngineError> {
    let Some((journal_key, records)) = dao.journal.get_all_records_for(op_id).await else {
        return Ok(OnDemandOutcome::NoBeginLog);
    };
    if let Some(last) = records.last() {
        if last.kind.is_terminal() {
            return Ok(OnDemandOutcome::Finished { committed: last.kind == JournalRecordKind::Committed });
        }
    }
    match build_op_state(dao, journal_key, &records).await? {
        Some(op) => {
            let status = op.status;
            let protocol = op.protocol;
            state.store.insert(op);
            dao.schedule_timeout(state, op_id, status, step_timeout(dao, protocol));
            Ok(OnDemandOutcome::Reconstructed)
        }
        None => Ok(OnDemandOutcome::NoBeginLog),
    }
}

async fn build_op_state<C: Clock>(
    dao: &Dao<C>,
    journal_key: SubtreeEntry,
    records: &[JournalRecord],
) -> Result<Option<OpState>, EngineError> {
    let Some(begin) = records.first() else { return Ok(None) };
    let JournalPayload::Begin { operation_type, blob } = &begin.payload else { return Ok(None) };
    let op_id = begin.op_id;

    let is_coordinator = dao.executor.is_coordinator(op_id).await;
    let sending_addresses = dao.executor.set_sending_addresses(op_id).await;
    // Only `server_address` is read again once an operation resumes past
    // its first hop (`subtree_entry_inode` only matters for the initial
    // fan-out), so the sentinel is a safe placeholder here; see DESIGN.md.
    let participants: Vec<Subtree> =
        sending_addresses.into_iter().map(|addr| Subtree::new(addr, SubtreeEntry::SERVER_GLOBAL)).collect();

    let protocol = classify_protocol(*operation_type, participants.len());

    let last_marker = records.iter().rev().find_map(|r| match &r.payload {
        JournalPayload::Update { marker } => Some(*marker),
        _ => None,
    });

    let status = map_status(protocol, is_coordinator, last_marker);

    let mut op = dao.build_op_state(op_id, *operation_type, blob.clone(), protocol, status, is_coordinator, participants, journal_key)?;
    // The coordinator's outstanding-vote countdown (spec.md §4.2
    // `received_votes`) is not itself journaled; a reconstructed
    // coordinator waiting on votes or acks must start the countdown back
    // at the full participant count, or the first post-restart vote/ack
    // would be mistaken for the last one.
    if matches!(status, Status::TpcCoordVReqSent | Status::TpcCoordVResultSent) {
        op.received_votes = op.participants.len();
    }
    Ok(Some(op))
}

fn classify_protocol(operation_type: OperationType, participant_count: usize) -> ProtocolKind {
    if operation_type == OperationType::OoeLbTest {
        ProtocolKind::Ooe
    } else if participant_count >= 2 {
        ProtocolKind::Tpc
    } else if participant_count == 1 {
        ProtocolKind::Mtpc
    } else {
        ProtocolKind::Ooe
    }
}

/// Map the last journal marker to a protocol status deterministically
///. A marker only ever journaled once a role is
/// fixed, so no marker case needs the `is_coordinator` flag except the
/// begin-only case.
fn map_status(protocol: ProtocolKind, is_coordinator: bool, last_marker: Option<LogMarker>) -> Status {
    match last_marker {
        None => match protocol {
            ProtocolKind::Tpc => {
                if is_coordinator {
                    Status::TpcCoordComp
                } else {
                    Status::TpcPartComp
                }
            }
            ProtocolKind::Mtpc => {
                if is_coordinator {
                    Status::MtpcCoordComp
                } else {
                    Status::MtpcPartComp
                }
            }
            ProtocolKind::Ooe => Status::OoeComp,
        },
        Some(LogMarker::TpcPVoteYes) => Status::TpcPartWaitVReqYes,
        Some(LogMarker::TpcPVoteNo) => Status::TpcPartWaitVReqNo,
        Some(LogMarker::TpcIVoteStart) => Status::TpcCoordVReqSent,
        Some(LogMarker::TpcICommitting) => Status::TpcCoordVResultSent,
        Some(LogMarker::TpcIAborting) => Status::TpcAborting,
        Some(LogMarker::MtpcPCommit) => Status::MtpcPartVoteSendYes,
        Some(LogMarker::MtpcPAbort) => Status::MtpcPartVoteSendNo,
        Some(LogMarker::MtpcIStartP) => Status::MtpcCoordReqSent,
        Some(LogMarker::OoeStartNext) => Status::OoeWaitResult,
        Some(LogMarker::OoeUndo) => Status::OoeWaitResultUndone,
    }
}

pub(crate) fn step_timeout<C: Clock>(dao: &Dao<C>, protocol: ProtocolKind) -> std::time::Duration {
    match protocol {
        ProtocolKind::Tpc => dao.config.tpc_rel_timeout(),
        ProtocolKind::Mtpc => dao.config.mtpc_rel_timeout(),
        ProtocolKind::Ooe => dao.config.ooe_rel_timeout(),
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
