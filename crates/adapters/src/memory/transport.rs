// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dao_core::subtree::PeerAddr;
use dao_wire::Event;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::error::TransportError;
use crate::transport::Transport;

/// A shared in-process switchboard connecting every [`InMemoryTransport`]
/// registered against it, for tests and `dao-harness`'s multi-node
/// smoke-test cluster. Modeled on the teacher's WebSocket event-bridge
/// registration (`oj-adapters::agent::coop::adapter::LocalAdapter::agents`):
/// one shared map from address to inbound channel, looked up on send.
#[derive(Clone, Default)]
pub struct InMemoryNetwork {
    inboxes: Arc<Mutex<HashMap<PeerAddr, mpsc::Sender<(PeerAddr, Event)>>>>,
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `addr` on this network and return its inbound `(sender,
    /// event)` receiver plus a [`Transport`] handle for sending from it.
    /// The sender address is stamped on every delivered event so a
    /// receiving `Dao`'s dispatcher can authorize the event against its
    /// operation's participant list — a real socket
    /// transport gets this for free from the connection it arrived on.
    pub async fn join(&self, addr: PeerAddr) -> (mpsc::Receiver<(PeerAddr, Event)>, InMemoryTransport) {
        let (tx, rx) = mpsc::channel(256);
        self.inboxes.lock().await.insert(addr.clone(), tx);
        (rx, InMemoryTransport { network: self.clone(), self_addr: addr })
    }
}

/// A [`Transport`] that delivers into an [`InMemoryNetwork`]'s registered
/// inboxes rather than over a real socket.
#[derive(Clone)]
pub struct InMemoryTransport {
    network: InMemoryNetwork,
    self_addr: PeerAddr,
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, to: &PeerAddr, event: Event) -> Result<(), TransportError> {
        let tx = {
            let inboxes = self.network.inboxes.lock().await;
            inboxes.get(to).cloned()
        };
        let tx = tx.ok_or_else(|| TransportError::SocketNotFound(to.clone()))?;
        tx.send((self.self_addr.clone(), event)).await.map_err(|_| {
            warn!(peer = %to, "in-memory transport target dropped its inbox");
            TransportError::SendFailed(to.clone(), "receiver dropped".to_string())
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
