//! OOE three-hop pipeline A -> B -> C, failing at the last hop: the
//! abort and its undo propagate back through B to the coordinator A
//!.

use crate::prelude::*;
use dao_adapters::ExecutorOutcome;
use dao_core::log_marker::JournalRecordKind;
use dao_core::operation_type::OperationType;
use dao_core::subtree::SubtreeEntry;
use dao_storage::JournalRecord;

fn kinds(records: &[JournalRecord]) -> Vec<JournalRecordKind> {
    records.iter().map(|r| r.kind).collect()
}

fn success_with_next(next: SubtreeEntry) -> ExecutorScript {
    ExecutorScript { do_outcome: Some(ExecutorOutcome::ExecutionSuccessful { next_participant: Some(next) }), ..Default::default() }
}

#[tokio::test]
async fn last_hop_failure_unwinds_through_every_earlier_hop() {
    let network = InMemoryNetwork::new();
    let mut a = live_node(&network, "a", fast_config()).await;
    let b = live_node(&network, "b", fast_config()).await;
    let c = live_node(&network, "c", fast_config()).await;

    let entry_b = SubtreeEntry(2);
    let entry_c = SubtreeEntry(3);
    a.mlt.seed(entry_b, b.addr.clone()).await;
    b.mlt.seed(entry_c, c.addr.clone()).await;

    a.executor.set_default(success_with_next(entry_b)).await;
    b.executor.set_default(success_with_next(entry_c)).await;
    c.executor.set_default(script_failure()).await;

    let a_entry = SubtreeEntry(1);
    let op_id = a.dao.start_coordinator(OperationType::OoeLbTest, vec![b'x'], Vec::new(), a_entry).await.unwrap();

    let result = wait_for_client_result(&mut a.client_results).await;
    assert!(!result.success);

    wait_until(|| async { a.journal.get_all_records_for(op_id).await.unwrap().1.last().unwrap().is_terminal() }).await;
    let (_, a_records) = a.journal.get_all_records_for(op_id).await.expect("coordinator journaled this operation");
    assert_eq!(
        kinds(&a_records),
        vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Update, JournalRecordKind::Aborted]
    );

    wait_until(|| async { b.journal.get_all_records_for(op_id).await.unwrap().1.last().unwrap().is_terminal() }).await;
    let (_, b_records) = b.journal.get_all_records_for(op_id).await.expect("middle hop journaled this operation");
    assert_eq!(
        kinds(&b_records),
        vec![JournalRecordKind::Start, JournalRecordKind::Update, JournalRecordKind::Update, JournalRecordKind::Aborted]
    );

    // C never advanced past its own failed local execution: no
    // OoeStartNext/OoeUndo update, straight to abort.
    wait_until(|| async { c.journal.get_all_records_for(op_id).await.unwrap().1.last().unwrap().is_terminal() }).await;
    let (_, c_records) = c.journal.get_all_records_for(op_id).await.expect("last hop journaled this operation");
    assert_eq!(kinds(&c_records), vec![JournalRecordKind::Start, JournalRecordKind::Aborted]);
}
