// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn op(n: u64) -> OperationId {
    OperationId(n)
}

#[tokio::test]
async fn unscripted_operation_defaults_to_success_with_no_next_hop() {
    let executor = InMemoryExecutor::new();
    let outcome = executor.do_request(op(1), OperationType::CreateINode, b"x").await;
    assert_eq!(outcome, ExecutorOutcome::ExecutionSuccessful { next_participant: None });
}

#[tokio::test]
async fn scripted_failure_is_returned_verbatim() {
    let executor = InMemoryExecutor::new();
    executor
        .script(
            op(1),
            ExecutorScript { do_outcome: Some(ExecutorOutcome::ExecutionUnsuccessful), ..Default::default() },
        )
        .await;
    let outcome = executor.do_request(op(1), OperationType::CreateINode, b"x").await;
    assert_eq!(outcome, ExecutorOutcome::ExecutionUnsuccessful);
}

#[tokio::test]
async fn ooe_next_hop_is_surfaced_on_success() {
    let executor = InMemoryExecutor::new();
    executor
        .script(
            op(1),
            ExecutorScript {
                do_outcome: Some(ExecutorOutcome::ExecutionSuccessful { next_participant: Some(SubtreeEntry(7)) }),
                ..Default::default()
            },
        )
        .await;
    let outcome = executor.do_request(op(1), OperationType::OoeLbTest, b"x").await;
    assert_eq!(outcome, ExecutorOutcome::ExecutionSuccessful { next_participant: Some(SubtreeEntry(7)) });
}

#[tokio::test]
async fn default_script_applies_when_no_per_op_override_is_registered() {
    let executor = InMemoryExecutor::new();
    executor.set_default(ExecutorScript { do_outcome: Some(ExecutorOutcome::ExecutionUnsuccessful), ..Default::default() }).await;
    // Not scripted per-op_id: falls back to the default.
    let outcome = executor.do_request(op(9), OperationType::CreateINode, b"x").await;
    assert_eq!(outcome, ExecutorOutcome::ExecutionUnsuccessful);

    // A per-op_id script still takes priority over the default.
    executor.script(op(9), ExecutorScript { do_outcome: Some(ExecutorOutcome::ExecutionSuccessful { next_participant: None }), ..Default::default() }).await;
    let outcome = executor.do_request(op(9), OperationType::CreateINode, b"x").await;
    assert_eq!(outcome, ExecutorOutcome::ExecutionSuccessful { next_participant: None });
}

#[tokio::test]
async fn pure_queries_return_scripted_values() {
    let executor = InMemoryExecutor::new();
    executor
        .script(
            op(1),
            ExecutorScript {
                sending_addresses: vec![PeerAddr::new("p1:9000")],
                subtree_entry_point: Some(SubtreeEntry(3)),
                is_coordinator: true,
                ..Default::default()
            },
        )
        .await;
    assert_eq!(executor.set_sending_addresses(op(1)).await, vec![PeerAddr::new("p1:9000")]);
    assert_eq!(executor.set_subtree_entry_point(op(1)).await, Some(SubtreeEntry(3)));
    assert!(executor.is_coordinator(op(1)).await);
}
