// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{harness, harness_on};
use dao_adapters::executor::ExecutorOutcome;
use dao_adapters::memory::{ExecutorScript, InMemoryNetwork};
use dao_core::operation_type::OperationType;

#[tokio::test]
async fn first_hop_with_no_next_participant_commits_immediately() {
    let (h, _rx) = harness("solo").await;
    let op_id = OperationId(1);

    let mut guard = h.dao.state.lock().await;
    start_coordinator_first_hop(&h.dao, &mut guard, op_id, OperationType::OoeLbTest, vec![b'x'], SubtreeEntry(10)).await.unwrap();
    assert!(!guard.store.contains(op_id));
    drop(guard);

    let mut client_results = h.client_results;
    let result = client_results.try_recv().expect("single-hop ooe emits a client result immediately");
    assert!(result.success);
}

#[tokio::test]
async fn first_hop_local_failure_aborts_without_contacting_anyone() {
    let (h, _rx) = harness("solo").await;
    let op_id = OperationId(2);
    h.executor.script(op_id, ExecutorScript { do_outcome: Some(ExecutorOutcome::ExecutionUnsuccessful), ..Default::default() }).await;

    let mut guard = h.dao.state.lock().await;
    start_coordinator_first_hop(&h.dao, &mut guard, op_id, OperationType::OoeLbTest, vec![b'x'], SubtreeEntry(10)).await.unwrap();
    assert!(!guard.store.contains(op_id));
    drop(guard);

    let mut client_results = h.client_results;
    let result = client_results.try_recv().expect("local failure emits a client result");
    assert!(!result.success);
}

#[tokio::test]
async fn three_node_chain_commits_end_to_end() {
    let network = InMemoryNetwork::new();
    let (coord, mut coord_rx) = harness_on(&network, "coord").await;
    let (mid, mut mid_rx) = harness_on(&network, "mid").await;
    let (tail, mut tail_rx) = harness_on(&network, "tail").await;
    coord.open_for_traffic();
    mid.open_for_traffic();
    tail.open_for_traffic();

    let op_id = OperationId(1);
    coord
        .executor
        .script(
            op_id,
            ExecutorScript {
                do_outcome: Some(ExecutorOutcome::ExecutionSuccessful { next_participant: Some(SubtreeEntry(2)) }),
                sending_addresses: vec![PeerAddr::new("mid")],
                ..Default::default()
            },
        )
        .await;
    mid.executor
        .script(
            op_id,
            ExecutorScript {
                do_outcome: Some(ExecutorOutcome::ExecutionSuccessful { next_participant: Some(SubtreeEntry(3)) }),
                sending_addresses: vec![PeerAddr::new("tail")],
                ..Default::default()
            },
        )
        .await;
    tail.executor
        .script(op_id, ExecutorScript { do_outcome: Some(ExecutorOutcome::ExecutionSuccessful { next_participant: None }), ..Default::default() })
        .await;

    coord.mlt.seed(SubtreeEntry(2), PeerAddr::new("mid")).await;
    mid.mlt.seed(SubtreeEntry(3), PeerAddr::new("tail")).await;

    {
        let mut guard = coord.dao.state.lock().await;
        start_coordinator_first_hop(&coord.dao, &mut guard, op_id, OperationType::OoeLbTest, vec![b'x'], SubtreeEntry(1)).await.unwrap();
        assert_eq!(guard.store.get(op_id).unwrap().status, Status::OoeWaitResult);
    }

    // coord -> mid: OoeOpReq
    let (sender, event) = mid_rx.recv().await.expect("mid receives the op request");
    crate::dispatcher::dispatch_peer_event(&mid.dao, sender, event).await.unwrap();
    {
        let guard = mid.dao.state.lock().await;
        assert_eq!(guard.store.get(op_id).unwrap().status, Status::OoeWaitResult);
    }

    // mid -> tail: OoeOpReq
    let (sender, event) = tail_rx.recv().await.expect("tail receives the op request");
    crate::dispatcher::dispatch_peer_event(&tail.dao, sender, event).await.unwrap();
    {
        let guard = tail.dao.state.lock().await;
        assert!(!guard.store.contains(op_id));
    }

    // tail -> mid: OoeAck
    let (sender, event) = mid_rx.recv().await.expect("mid receives the tail's ack");
    assert_eq!(sender, PeerAddr::new("tail"));
    crate::dispatcher::dispatch_peer_event(&mid.dao, sender, event).await.unwrap();
    {
        let guard = mid.dao.state.lock().await;
        assert!(!guard.store.contains(op_id));
    }

    // mid -> coord: OoeAck
    let (sender, event) = coord_rx.recv().await.expect("coord receives mid's ack");
    assert_eq!(sender, PeerAddr::new("mid"));
    crate::dispatcher::dispatch_peer_event(&coord.dao, sender, event).await.unwrap();
    {
        let guard = coord.dao.state.lock().await;
        assert!(!guard.store.contains(op_id));
    }

    let mut client_results = coord.client_results;
    let result = client_results.try_recv().expect("the full chain commits and acks back to the coordinator");
    assert!(result.success);
}

#[tokio::test]
async fn abort_in_the_middle_of_the_chain_relays_back_and_undoes() {
    let (coord, _coord_rx) = harness("coord").await;
    coord.open_for_traffic();

    let op_id = OperationId(7);
    coord.executor.script(op_id, ExecutorScript { undo_outcome: Some(ExecutorOutcome::UndoSuccessful), ..Default::default() }).await;

    let mut guard = coord.dao.state.lock().await;
    let participants = vec![dao_core::test_support::participant("predecessor", 1)];
    let op = coord.dao.build_op_state(op_id, OperationType::OoeLbTest, vec![b'x'], ProtocolKind::Ooe, Status::OoeWaitResult, false, participants, SubtreeEntry(10)).unwrap();
    guard.store.insert(op);

    handle_event(&coord.dao, &mut guard, PeerAddr::new("successor"), Event::OoeAborted { op_id }).await.unwrap();
    assert!(!guard.store.contains(op_id));
}
