// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory operation state.
//!
//! One [`OpState`] exists per in-flight operation, owned exclusively by the
//! `OperationStore` in `dao-storage`. This crate only defines the shape and
//! its construction invariants; the store owns the `op_id -> OpState` map
//! and the locking discipline around it.

use crate::operation_id::OperationId;
use crate::operation_type::OperationType;
use crate::protocol::ProtocolKind;
use crate::status::Status;
use crate::subtree::{Subtree, SubtreeEntry};
use std::time::Instant;
use thiserror::Error;

/// Violated construction invariant: `participants.len() >= 1` except for
/// OOE-first, `operation_blob.len() > 0`, `id != 0`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("operation id must not be zero")]
    ZeroId,
    #[error("operation_blob must not be empty")]
    EmptyBlob,
    #[error("non-OOE-first operations require at least one participant")]
    MissingParticipants,
}

/// One in-flight or (briefly, pending cleanup) completed operation.
///
/// `participants` semantics depend on protocol: for TPC/MTPC
/// the coordinator holds the full participant list and each participant
/// holds the single-element list `{coordinator}`; for OOE the list holds
/// `{predecessor}` on intermediate executors, `{initiator}` on the last
/// hop, and is empty on the first hop.
#[derive(Debug, Clone)]
pub struct OpState {
    pub id: OperationId,
    pub operation_type: OperationType,
    pub protocol: ProtocolKind,
    pub status: Status,
    pub is_coordinator: bool,
    pub participants: Vec<Subtree>,
    pub subtree_entry: SubtreeEntry,
    pub operation_blob: Vec<u8>,
    /// Outstanding vote count during TPC; meaningful only for the
    /// coordinator role.
    pub received_votes: usize,
    pub overall_deadline: Instant,
}

impl OpState {
    pub fn builder(id: OperationId, operation_type: OperationType, operation_blob: Vec<u8>) -> OpStateBuilder {
        OpStateBuilder::new(id, operation_type, operation_blob)
    }

    /// Whether this is the first hop of an OOE chain, the one case where an
    /// empty `participants` list is valid.
    pub fn is_ooe_first_hop(&self) -> bool {
        self.protocol == ProtocolKind::Ooe && self.participants.is_empty() && self.is_coordinator
    }
}

/// Builder enforcing [`OpState`]'s construction invariants in one place,
/// rather than scattering `debug_assert!`s across every call site that
/// creates an `OpState` (recovery reconstruction, fresh `start_coordinator`
/// calls, and participant-side materialization all go through this).
pub struct OpStateBuilder {
    id: OperationId,
    operation_type: OperationType,
    protocol: ProtocolKind,
    status: Status,
    is_coordinator: bool,
    participants: Vec<Subtree>,
    subtree_entry: SubtreeEntry,
    operation_blob: Vec<u8>,
    received_votes: usize,
    overall_deadline: Instant,
}

impl OpStateBuilder {
    pub fn new(id: OperationId, operation_type: OperationType, operation_blob: Vec<u8>) -> Self {
        Self {
            id,
            operation_type,
            protocol: ProtocolKind::Mtpc,
            status: Status::MtpcPartComp,
            is_coordinator: false,
            participants: Vec::new(),
            subtree_entry: SubtreeEntry::SERVER_GLOBAL,
            operation_blob,
            received_votes: 0,
            overall_deadline: Instant::now(),
        }
    }

    pub fn protocol(mut self, protocol: ProtocolKind) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn is_coordinator(mut self, is_coordinator: bool) -> Self {
        self.is_coordinator = is_coordinator;
        self
    }

    pub fn participants(mut self, participants: Vec<Subtree>) -> Self {
        self.participants = participants;
        self
    }

    pub fn subtree_entry(mut self, subtree_entry: SubtreeEntry) -> Self {
        self.subtree_entry = subtree_entry;
        self
    }

    pub fn received_votes(mut self, received_votes: usize) -> Self {
        self.received_votes = received_votes;
        self
    }

    pub fn overall_deadline(mut self, overall_deadline: Instant) -> Self {
        self.overall_deadline = overall_deadline;
        self
    }

    pub fn build(self) -> Result<OpState, InvariantViolation> {
        if self.id.is_none() {
            return Err(InvariantViolation::ZeroId);
        }
        if self.operation_blob.is_empty() {
            return Err(InvariantViolation::EmptyBlob);
        }
        let is_ooe_first = self.protocol == ProtocolKind::Ooe && self.is_coordinator && self.participants.is_empty();
        if self.participants.is_empty() && !is_ooe_first {
            return Err(InvariantViolation::MissingParticipants);
        }
        Ok(OpState {
            id: self.id,
            operation_type: self.operation_type,
            protocol: self.protocol,
            status: self.status,
            is_coordinator: self.is_coordinator,
            participants: self.participants,
            subtree_entry: self.subtree_entry,
            operation_blob: self.operation_blob,
            received_votes: self.received_votes,
            overall_deadline: self.overall_deadline,
        })
    }
}

#[cfg(test)]
#[path = "op_state_tests.rs"]
mod tests;
