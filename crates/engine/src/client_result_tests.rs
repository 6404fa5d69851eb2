// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::protocol::ProtocolKind;

#[test]
fn move_subtree_routes_to_load_balancing_queue() {
    let result = ClientResult::new(OperationId(1), ProtocolKind::Tpc, OperationType::MoveSubtree, true);
    assert_eq!(result.queue, ResultQueue::LoadBalancing);
}

#[test]
fn ooe_lb_test_routes_to_load_balancing_queue() {
    let result = ClientResult::new(OperationId(2), ProtocolKind::Ooe, OperationType::OoeLbTest, true);
    assert_eq!(result.queue, ResultQueue::LoadBalancing);
}

#[test]
fn change_partition_ownership_routes_to_metadata_queue() {
    let result = ClientResult::new(OperationId(3), ProtocolKind::Tpc, OperationType::ChangePartitionOwnership, false);
    assert_eq!(result.queue, ResultQueue::Metadata);
}

#[test]
fn create_inode_routes_to_metadata_queue() {
    let result = ClientResult::new(OperationId(4), ProtocolKind::Mtpc, OperationType::CreateINode, true);
    assert_eq!(result.queue, ResultQueue::Metadata);
}
