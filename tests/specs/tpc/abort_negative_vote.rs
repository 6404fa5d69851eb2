//! TPC abort when one participant votes no.

use crate::prelude::*;
use dao_core::log_marker::JournalRecordKind;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{Subtree, SubtreeEntry};
use dao_storage::JournalRecord;

fn kinds(records: &[JournalRecord]) -> Vec<JournalRecordKind> {
    records.iter().map(|r| r.kind).collect()
}

#[tokio::test]
async fn one_negative_vote_aborts_the_whole_operation() {
    let network = InMemoryNetwork::new();
    let mut coord = live_node(&network, "coord", fast_config()).await;
    let p1 = live_node(&network, "p1", fast_config()).await;
    let p2 = live_node(&network, "p2", fast_config()).await;
    // p2's local execution fails; arranged before the operation id exists
    // via the executor's default fallback (see dao-adapters::memory).
    p2.executor.set_default(script_failure()).await;

    let participants = vec![Subtree::new(p1.addr.clone(), SubtreeEntry(1)), Subtree::new(p2.addr.clone(), SubtreeEntry(2))];
    let op_id = coord.dao.start_coordinator(OperationType::CreateINode, vec![b'x'], participants, SubtreeEntry(10)).await.unwrap();

    let result = wait_for_client_result(&mut coord.client_results).await;
    assert!(!result.success);

    wait_until(|| async { coord.journal.get_all_records_for(op_id).await.unwrap().1.last().unwrap().is_terminal() }).await;
    let (_, c_records) = coord.journal.get_all_records_for(op_id).await.unwrap();
    assert_eq!(kinds(&c_records), vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Update, JournalRecordKind::Aborted]);

    wait_until(|| async { p2.journal.get_all_records_for(op_id).await.unwrap().1.last().unwrap().is_terminal() }).await;
    let (_, p2_records) = p2.journal.get_all_records_for(op_id).await.unwrap();
    assert_eq!(kinds(&p2_records), vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Aborted]);

    wait_until(|| async { p1.journal.get_all_records_for(op_id).await.unwrap().1.last().unwrap().is_terminal() }).await;
    let (_, p1_records) = p1.journal.get_all_records_for(op_id).await.unwrap();
    assert_eq!(kinds(&p1_records), vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Aborted]);
}
