//! TPC coordinator crash after committing, before all acks (spec.md §8
//! scenario 3). The journal below is hand-written to stand in for "the
//! process that wrote it has since crashed": a fresh `Dao` is built over
//! the same directory and must recover the outstanding-ack countdown
//! correctly, not decide on the first ack to arrive.

use crate::prelude::*;
use dao_core::log_marker::{JournalRecordKind, LogMarker};
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{PeerAddr, SubtreeEntry};
use dao_engine::run_startup_recovery;
use dao_storage::{FileJournalGateway, JournalGateway, JournalRecord};
use dao_wire::Event;
use std::sync::Arc;
use std::time::Duration;

fn kinds(records: &[JournalRecord]) -> Vec<JournalRecordKind> {
    records.iter().map(|r| r.kind).collect()
}

#[tokio::test]
async fn recovered_coordinator_waits_for_both_acks_before_committing() {
    let dir = tempfile::tempdir().unwrap();
    let journal: Arc<dyn JournalGateway> = Arc::new(FileJournalGateway::open(dir.path()).unwrap());

    let op_id = OperationId(42);
    let journal_key = SubtreeEntry(10);
    journal.append_begin(journal_key, op_id, OperationType::CreateINode, vec![b'x']).await.unwrap();
    journal.append_update(journal_key, op_id, LogMarker::TpcIVoteStart).await.unwrap();
    journal.append_update(journal_key, op_id, LogMarker::TpcICommitting).await.unwrap();

    let network = InMemoryNetwork::new();
    let coord = live_node_with_journal(&network, "coord", fast_config(), Arc::clone(&journal)).await;
    let p1 = PeerAddr::new("p1");
    let p2 = PeerAddr::new("p2");
    let (mut p1_rx, p1_transport) = network.join(p1.clone()).await;
    let (mut p2_rx, p2_transport) = network.join(p2.clone()).await;
    coord.executor.script(op_id, ExecutorScript { is_coordinator: true, sending_addresses: vec![p1.clone(), p2.clone()], ..Default::default() }).await;

    run_startup_recovery(&coord.dao, &[journal_key]).await.unwrap();

    // The recovered coordinator resends its TpcRCommit to both
    // participants, same as a live retry would.
    let (_, event) = wait_for_event(&mut p1_rx).await;
    assert!(matches!(event, Event::TpcRCommit { op_id: id } if id == op_id));
    let (_, event) = wait_for_event(&mut p2_rx).await;
    assert!(matches!(event, Event::TpcRCommit { op_id: id } if id == op_id));

    p1_transport.send(&coord.addr, Event::TpcAck { op_id }).await.unwrap();

    // A single ack must not be enough: if `received_votes` had not been
    // restored to the participant count on recovery, this one ack alone
    // would already satisfy the countdown and commit early.
    tokio::time::sleep(Duration::from_millis(80)).await;
    let (_, records) = journal.get_all_records_for(op_id).await.expect("journaled before recovery");
    assert_eq!(
        kinds(&records),
        vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Update],
        "committed after only one of two acks"
    );

    p2_transport.send(&coord.addr, Event::TpcAck { op_id }).await.unwrap();

    wait_until(|| async { journal.get_all_records_for(op_id).await.unwrap().1.last().unwrap().is_terminal() }).await;
    let (_, records) = journal.get_all_records_for(op_id).await.unwrap();
    assert_eq!(
        kinds(&records),
        vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Update, JournalRecordKind::Committed]
    );

    // The client that originally asked for this operation is long gone
    // by the time the process restarts; recovery must not manufacture a
    // second client result for it.
    let mut client_results = coord.client_results;
    assert!(tokio::time::timeout(Duration::from_millis(50), client_results.recv()).await.is_err());
}
