// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The client result queue payload: `{op_id, protocol,
//! success}`, routed to the load-balancing queue if `type` is
//! `MoveSubtree`/`OoeLbTest` and the metadata queue otherwise.

use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::protocol::ProtocolKind;

/// Which outbound queue a [`ClientResult`] belongs on. The DAO itself has
/// no metadata or load-balancing queue of its own — this only tells the
/// process-wiring layer (`dao-daemon`) which external queue to forward
/// onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultQueue {
    LoadBalancing,
    Metadata,
}

/// The one-ACK-or-NACK-per-operation result delivered to the client that
/// called `start_coordinator` (spec.md §7: "the client receives exactly
/// one of {ACK, NACK} per submitted operation").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientResult {
    pub op_id: OperationId,
    pub protocol: ProtocolKind,
    pub success: bool,
    pub queue: ResultQueue,
}

impl ClientResult {
    pub fn new(op_id: OperationId, protocol: ProtocolKind, operation_type: OperationType, success: bool) -> Self {
        let queue =
            if operation_type.routes_to_load_balancing_queue() { ResultQueue::LoadBalancing } else { ResultQueue::Metadata };
        Self { op_id, protocol, success, queue }
    }
}

#[cfg(test)]
#[path = "client_result_tests.rs"]
mod tests;
