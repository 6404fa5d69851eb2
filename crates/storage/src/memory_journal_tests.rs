// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dao_core::subtree::SubtreeEntry;

fn key() -> SubtreeEntry {
    SubtreeEntry(7)
}

#[tokio::test]
async fn records_and_reads_back_full_history() {
    let gw = InMemoryJournalGateway::new();
    let op = OperationId(42);
    gw.append_begin(key(), op, OperationType::CreateINode, vec![b'x']).await.unwrap();
    gw.append_update(key(), op, LogMarker::TpcIVoteStart).await.unwrap();
    gw.append_commit(key(), op).await.unwrap();

    let (journal_key, records) = gw.get_all_records_for(op).await.unwrap();
    assert_eq!(journal_key, key());
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].kind, JournalRecordKind::Start);
    assert_eq!(records[2].kind, JournalRecordKind::Committed);
}

#[tokio::test]
async fn rejects_append_after_terminal_record() {
    let gw = InMemoryJournalGateway::new();
    let op = OperationId(1);
    gw.append_begin(key(), op, OperationType::CreateINode, vec![b'x']).await.unwrap();
    gw.append_commit(key(), op).await.unwrap();

    let err = gw.append_abort(key(), op).await.unwrap_err();
    assert!(matches!(err, JournalError::AlreadyTerminal(id) if id == op));
}

#[tokio::test]
async fn enumerate_open_excludes_terminal_operations() {
    let gw = InMemoryJournalGateway::new();
    let open_op = OperationId(1);
    let done_op = OperationId(2);
    gw.append_begin(key(), open_op, OperationType::CreateINode, vec![b'x']).await.unwrap();
    gw.append_begin(key(), done_op, OperationType::CreateINode, vec![b'x']).await.unwrap();
    gw.append_commit(key(), done_op).await.unwrap();

    let open = gw.enumerate_open(key()).await;
    assert_eq!(open, HashSet::from([open_op]));
}

#[tokio::test]
async fn unknown_operation_returns_none() {
    let gw = InMemoryJournalGateway::new();
    assert!(gw.get_all_records_for(OperationId(999)).await.is_none());
}
