// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::test_support::harness;
use dao_core::operation_type::OperationType;
use dao_core::subtree::SubtreeEntry;

#[tokio::test]
async fn request_worker_drains_the_inbound_channel_and_dispatches_each_event() {
    let (h, rx) = harness("participant").await;
    h.open_for_traffic();
    let op_id = OperationId(1);
    let dao = Arc::new(h.dao);

    let (tx, worker_rx) = mpsc::channel(8);
    let worker = tokio::spawn(run_request_worker(dao.clone(), worker_rx));
    drop(rx);

    tx.send((
        PeerAddr::new("coord"),
        Event::TpcOpReq { op_id, operation_type: OperationType::CreateINode, self_subtree: SubtreeEntry(1), initiator_subtree: SubtreeEntry(10), blob: vec![b'x'] },
    ))
    .await
    .unwrap();
    drop(tx);

    worker.await.expect("worker task does not panic");

    let guard = dao.state.lock().await;
    assert!(guard.store.contains(op_id), "the dispatched op req should have started a participant state");
}

#[tokio::test]
async fn request_worker_exits_cleanly_once_the_inbound_channel_closes() {
    let (h, rx) = harness("participant").await;
    h.open_for_traffic();
    let dao = Arc::new(h.dao);
    drop(rx);

    let (tx, worker_rx) = mpsc::channel(8);
    drop(tx);
    tokio::time::timeout(Duration::from_secs(1), run_request_worker(dao, worker_rx)).await.expect("worker exits once the sender side is dropped");
}

#[tokio::test]
async fn drain_due_timeouts_fires_only_entries_whose_deadline_has_passed() {
    let (h, _rx) = harness("coordinator").await;
    let op_id = OperationId(2);
    let participants = vec![dao_core::test_support::participant("p1", 1)];
    let mut guard = h.dao.state.lock().await;
    let op = h.dao.build_op_state(op_id, OperationType::CreateINode, vec![b'x'], ProtocolKind::Tpc, Status::TpcCoordVReqSent, true, participants, SubtreeEntry(10)).unwrap();
    guard.store.insert(op);
    // Arm a timeout far in the future: it must not fire yet.
    h.dao.schedule_timeout(&mut guard, op_id, Status::TpcCoordVReqSent, Duration::from_secs(3600));
    drop(guard);

    drain_due_timeouts(&h.dao).await;
    let guard = h.dao.state.lock().await;
    assert_eq!(guard.store.get(op_id).unwrap().status, Status::TpcCoordVReqSent, "timeout not yet due must not have fired");
    assert_eq!(guard.timeouts.len(), 1);
}

#[tokio::test]
async fn drain_due_timeouts_drops_a_stale_entry_whose_status_already_moved_on() {
    let (h, _rx) = harness("coordinator").await;
    let op_id = OperationId(3);
    let participants = vec![dao_core::test_support::participant("p1", 1)];
    let mut guard = h.dao.state.lock().await;
    let op = h.dao.build_op_state(op_id, OperationType::CreateINode, vec![b'x'], ProtocolKind::Tpc, Status::TpcCoordVReqSent, true, participants, SubtreeEntry(10)).unwrap();
    guard.store.insert(op);
    // Arm a timeout for a status this operation has already left.
    h.dao.schedule_timeout(&mut guard, op_id, Status::TpcCoordVResultSent, Duration::from_millis(0));
    drop(guard);

    h.clock.advance(Duration::from_secs(1));
    drain_due_timeouts(&h.dao).await;

    let guard = h.dao.state.lock().await;
    // Still in its real status: the stale timer must have been dropped as
    // a no-op rather than acted on.
    assert_eq!(guard.store.get(op_id).unwrap().status, Status::TpcCoordVReqSent);
    assert!(guard.timeouts.is_empty());
}

#[tokio::test]
async fn drain_due_timeouts_fires_a_matching_entry_once_its_deadline_passes() {
    let (h, _rx) = harness("coordinator").await;
    let op_id = OperationId(4);
    let participants = vec![dao_core::test_support::participant("p1", 1)];
    let mut guard = h.dao.state.lock().await;
    let op = h.dao.build_op_state(op_id, OperationType::CreateINode, vec![b'x'], ProtocolKind::Tpc, Status::TpcCoordVReqSent, true, participants, SubtreeEntry(10)).unwrap();
    guard.store.insert(op);
    h.dao.schedule_timeout(&mut guard, op_id, Status::TpcCoordVReqSent, Duration::from_millis(0));
    drop(guard);

    h.clock.advance(Duration::from_secs(1));
    drain_due_timeouts(&h.dao).await;

    let guard = h.dao.state.lock().await;
    // TPC's coordinator-vote-sent timeout re-requests votes and reschedules
    // itself rather than removing the operation.
    assert_eq!(guard.store.get(op_id).unwrap().status, Status::TpcCoordVReqSent);
    assert_eq!(guard.timeouts.len(), 1, "handle_timeout rescheduled the next retry");
}
