// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Peer-to-peer message delivery: per-peer send ordering is preserved by
//! the underlying transport.

use async_trait::async_trait;
use dao_core::subtree::PeerAddr;
use dao_wire::Event;

use crate::error::TransportError;

/// Sends a single [`Event`] to a peer address.
///
/// Implementations are expected to preserve FIFO ordering of sends to the
/// same peer; they are not required to preserve ordering
/// across distinct peers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, to: &PeerAddr, event: Event) -> Result<(), TransportError>;
}
