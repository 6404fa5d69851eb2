// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level error taxonomy.

use dao_core::operation_id::OperationId;
use dao_core::subtree::PeerAddr;
use thiserror::Error;

/// The kind of send failure, replacing the source's "errno smuggled as
/// index of failing receiver".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendKind {
    SocketNotFound,
    SendFailed,
}

/// Explicit `Result<(), SendError>` in place of the source's errno/index
/// convention (spec.md §9 REDESIGN FLAGS: "replace with explicit
/// `Result<(), SendError{which_receiver: usize, kind: SendKind}>`").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("send to receiver {which_receiver} ({peer}) failed: {kind:?}")]
pub struct SendError {
    pub which_receiver: usize,
    pub peer: PeerAddr,
    pub kind: SendKind,
}

/// Failures a protocol transition or the dispatcher can report. None of
/// these are surfaced to the peer as a protocol error (spec.md §7:
/// "wrong event for current status -> reply EventReRequest" etc. are
/// protocol states, not Rust errors) — this enum covers the remaining
/// taxonomy: transient send failures the timeout path will retry, and
/// journal failures bubbled up from `dao-storage`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("send failed, operation {0} left in pre-transition status for the timeout path to retry")]
    Send(#[from] SendError),

    #[error("journal append failed for operation {0}: {1}")]
    Journal(OperationId, #[source] dao_storage::JournalError),

    #[error(transparent)]
    Fatal(#[from] dao_core::FatalError),
}
