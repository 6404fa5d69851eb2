// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure taxonomy for the external collaborators: transient transport
//! and transient routing failures.

use dao_core::subtree::SubtreeEntry;
use thiserror::Error;

/// Failure sending an [`Event`](dao_wire::Event) to a peer.
///
/// Both variants are transient: the caller rebuilds the socket by
/// reconsulting the MLT and retries once; if that also fails the operation
/// stays in its pre-transition status and the timeout path retries later.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("no socket/connection exists for peer {0}")]
    SocketNotFound(dao_core::subtree::PeerAddr),

    #[error("send to peer {0} failed: {1}")]
    SendFailed(dao_core::subtree::PeerAddr, String),
}

/// Failure resolving a subtree's owning peer through the MLT.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MltError {
    /// No MLT available at all; fatal. The caller is expected to repair
    /// it and the operation will be recovered at next start.
    #[error("no MLT available")]
    NoMlt,

    #[error("MLT has no owner recorded for subtree {0}")]
    NotFound(SubtreeEntry),
}
