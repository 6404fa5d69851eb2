//! MTPC abort of a subtree move, requiring undo before the final abort
//! record.

use crate::prelude::*;
use dao_core::log_marker::JournalRecordKind;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{Subtree, SubtreeEntry};
use dao_storage::JournalRecord;

fn kinds(records: &[JournalRecord]) -> Vec<JournalRecordKind> {
    records.iter().map(|r| r.kind).collect()
}

#[tokio::test]
async fn participant_abort_drives_coordinator_through_undo_to_aborted() {
    let network = InMemoryNetwork::new();
    let mut coord = live_node(&network, "coord", fast_config()).await;
    let p1 = live_node(&network, "p1", fast_config()).await;
    // p1's local execution of the move fails, so it votes abort directly
    // (MTPC has no separate vote phase).
    p1.executor.set_default(script_failure()).await;

    let participants = vec![Subtree::new(p1.addr.clone(), SubtreeEntry(1))];
    let op_id = coord.dao.start_coordinator(OperationType::MoveSubtree, vec![b'x'], participants, SubtreeEntry(10)).await.unwrap();

    let result = wait_for_client_result(&mut coord.client_results).await;
    assert!(!result.success);

    // MoveSubtree always journals to the server-global key regardless of
    // the subtree_entry passed to start_coordinator.
    wait_until(|| async { coord.journal.get_all_records_for(op_id).await.unwrap().1.last().unwrap().is_terminal() }).await;
    let (_, c_records) = coord.journal.get_all_records_for(op_id).await.expect("coordinator journaled this operation");
    assert_eq!(kinds(&c_records), vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Aborted]);

    wait_until(|| async { p1.journal.get_all_records_for(op_id).await.unwrap().1.last().unwrap().is_terminal() }).await;
    let (_, p1_records) = p1.journal.get_all_records_for(op_id).await.expect("participant journaled this operation");
    assert_eq!(kinds(&p1_records), vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Aborted]);
}
