//! TPC happy path, two participants.

use crate::prelude::*;
use dao_core::log_marker::JournalRecordKind;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{Subtree, SubtreeEntry};
use dao_storage::JournalRecord;

fn kinds(records: &[JournalRecord]) -> Vec<JournalRecordKind> {
    records.iter().map(|r| r.kind).collect()
}

#[tokio::test]
async fn two_participants_all_yes_commits_and_acks_coordinator() {
    let network = InMemoryNetwork::new();
    let mut coord = live_node(&network, "coord", fast_config()).await;
    let p1 = live_node(&network, "p1", fast_config()).await;
    let p2 = live_node(&network, "p2", fast_config()).await;

    let participants = vec![Subtree::new(p1.addr.clone(), SubtreeEntry(1)), Subtree::new(p2.addr.clone(), SubtreeEntry(2))];
    let op_id = coord.dao.start_coordinator(OperationType::CreateINode, vec![b'x'], participants, SubtreeEntry(10)).await.unwrap();

    let result = wait_for_client_result(&mut coord.client_results).await;
    assert!(result.success);
    assert_eq!(result.op_id, op_id);

    // The coordinator's journal logs exactly the sequence spec.md §8
    // scenario 1 names: Start, TpcIVoteStart, TpcICommitting, Committed.
    wait_until(|| async { coord.journal.enumerate_open(SubtreeEntry(10)).await.is_empty() }).await;
    let (_, records) = coord.journal.get_all_records_for(op_id).await.expect("coordinator journaled this operation");
    assert_eq!(
        kinds(&records),
        vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Update, JournalRecordKind::Committed]
    );

    // Both participants settle on a commit of their own, having acked the
    // coordinator back.
    for p in [&p1, &p2] {
        wait_until(|| async {
            p.journal.get_all_records_for(op_id).await.map(|(_, r)| r.last().unwrap().is_terminal()).unwrap_or(false)
        })
        .await;
        let (_, records) = p.journal.get_all_records_for(op_id).await.expect("participant journaled this operation");
        assert_eq!(kinds(&records), vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Committed]);
    }
}
