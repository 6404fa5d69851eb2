// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::operation_id::OperationId;
use std::collections::BinaryHeap;
use std::time::Duration;

#[test]
fn heap_pops_earliest_deadline_first() {
    let base = Instant::now();
    let mut heap = BinaryHeap::new();
    heap.push(TimeoutEntry::new(OperationId(1), base + Duration::from_secs(30), Status::TpcCoordVReqSent));
    heap.push(TimeoutEntry::new(OperationId(2), base + Duration::from_secs(10), Status::TpcCoordVReqSent));
    heap.push(TimeoutEntry::new(OperationId(3), base + Duration::from_secs(20), Status::TpcCoordVReqSent));

    let order: Vec<_> = std::iter::from_fn(|| heap.pop()).map(|e| e.op_id).collect();
    assert_eq!(order, vec![OperationId(2), OperationId(3), OperationId(1)]);
}

#[test]
fn stale_when_status_has_moved_on() {
    let entry = TimeoutEntry::new(OperationId(1), Instant::now(), Status::TpcCoordVReqSent);
    assert!(!entry.is_stale(Some(Status::TpcCoordVReqSent)));
    assert!(entry.is_stale(Some(Status::TpcCoordComp)));
}

#[test]
fn stale_when_operation_no_longer_exists() {
    let entry = TimeoutEntry::new(OperationId(1), Instant::now(), Status::TpcCoordVReqSent);
    assert!(entry.is_stale(None));
}
