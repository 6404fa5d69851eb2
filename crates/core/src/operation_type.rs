// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The catalog of cross-server operation kinds the DAO coordinates.
//!
//! The executor interprets `operation_blob` according to this tag; the DAO
//! itself only needs to know two things about a type: which protocol it
//! runs under (decided by `participants.len()`, not by type) and whether
//! abort requires an undo request (the "subtree-move family").

use crate::simple_display;

/// Kind of cross-server filesystem mutation being coordinated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OperationType {
    /// Relocate a subtree from one MDS to another. Always runs server-global
    /// journal, always requires undo on abort.
    MoveSubtree,
    /// Change which MDS owns a partition. Same journal/undo treatment as
    /// `MoveSubtree`.
    ChangePartitionOwnership,
    CreateINode,
    SetAttr,
    Rename,
    Unlink,
    Link,
    /// Synthetic type used by conformance tests of the TPC/MTPC engine.
    OrderedOperationTest,
    /// Synthetic type used by conformance tests of the OOE pipeline
    /// (`_LB_` = load-balancing style multi-hop chain).
    OoeLbTest,
}

impl OperationType {
    /// Operations whose abort path must request undo from the executor
    /// before the journal's abort record is appended: the subtree-move
    /// family, `MoveSubtree` and `ChangePartitionOwnership`.
    pub fn requires_undo(&self) -> bool {
        matches!(self, OperationType::MoveSubtree | OperationType::ChangePartitionOwnership)
    }

    /// Operations whose coordinator-side journal is the server-global
    /// journal rather than a per-subtree journal.
    pub fn uses_server_journal(&self) -> bool {
        matches!(self, OperationType::MoveSubtree | OperationType::ChangePartitionOwnership)
    }

    /// Client result queue routing: `MoveSubtree` and
    /// `OoeLbTest` go to the load-balancing queue, everything else to the
    /// metadata queue.
    pub fn routes_to_load_balancing_queue(&self) -> bool {
        matches!(self, OperationType::MoveSubtree | OperationType::OoeLbTest)
    }
}

simple_display! {
    OperationType {
        MoveSubtree => "move_subtree",
        ChangePartitionOwnership => "change_partition_ownership",
        CreateINode => "create_inode",
        SetAttr => "set_attr",
        Rename => "rename",
        Unlink => "unlink",
        Link => "link",
        OrderedOperationTest => "ordered_operation_test",
        OoeLbTest => "ooe_lb_test",
    }
}
