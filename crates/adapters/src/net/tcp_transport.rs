// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A TCP-backed `Transport`: one persistent outbound connection per peer,
//! each with its own writer task and an unbounded queue, so a slow or
//! down peer never blocks a send to a different peer — ordering is
//! preserved per-peer, not globally. Connections are dialed lazily on
//! first send and redialed on the next send after a write failure —
//! there is no background reconnect loop; transport failure is treated
//! as transient and left to the caller to retry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_util::codec::{FramedWrite, LengthDelimitedCodec};
use tracing::{info, warn};

use dao_core::subtree::PeerAddr;
use dao_wire::Event;
use futures::SinkExt;

use crate::error::TransportError;
use crate::transport::Transport;

/// One self-identifying byte string sent as the very first frame of every
/// outbound connection, so the listening side can label inbound events
/// with a logical `PeerAddr` rather than the ephemeral source port of the
/// TCP connection (see `tcp_listener`).
fn handshake_frame(self_addr: &PeerAddr) -> Bytes {
    Bytes::copy_from_slice(self_addr.as_str().as_bytes())
}

struct PeerConnection {
    tx: mpsc::UnboundedSender<Bytes>,
}

/// Shared, lazily-connecting TCP transport. Clone cheaply (an `Arc`
/// internally) and hand one instance to every task that needs to send.
pub struct TcpTransport {
    self_addr: PeerAddr,
    connections: Mutex<HashMap<PeerAddr, PeerConnection>>,
}

impl TcpTransport {
    pub fn new(self_addr: PeerAddr) -> Arc<Self> {
        Arc::new(Self { self_addr, connections: Mutex::new(HashMap::new()) })
    }

    async fn connection_for(&self, to: &PeerAddr) -> Result<mpsc::UnboundedSender<Bytes>, TransportError> {
        let mut guard = self.connections.lock().await;
        if let Some(conn) = guard.get(to) {
            return Ok(conn.tx.clone());
        }
        let stream = TcpStream::connect(to.as_str())
            .await
            .map_err(|e| TransportError::SendFailed(to.clone(), e.to_string()))?;
        let (tx, rx) = mpsc::unbounded_channel::<Bytes>();
        tx.send(handshake_frame(&self.self_addr)).map_err(|_| TransportError::SocketNotFound(to.clone()))?;
        spawn_writer(stream, rx, to.clone());
        guard.insert(to.clone(), PeerConnection { tx: tx.clone() });
        Ok(tx)
    }

    /// Drop a connection after a write failure so the next send redials.
    async fn forget(&self, to: &PeerAddr) {
        self.connections.lock().await.remove(to);
    }
}

fn spawn_writer(stream: TcpStream, mut rx: mpsc::UnboundedReceiver<Bytes>, peer: PeerAddr) {
    tokio::spawn(async move {
        let mut framed = FramedWrite::new(stream, LengthDelimitedCodec::new());
        while let Some(frame) = rx.recv().await {
            if let Err(err) = framed.send(frame).await {
                warn!(peer = %peer, error = %err, "tcp transport writer failed, connection will be redialed");
                return;
            }
        }
        info!(peer = %peer, "tcp transport writer exiting, sender dropped");
    });
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, to: &PeerAddr, event: Event) -> Result<(), TransportError> {
        let tx = self.connection_for(to).await?;
        let frame = dao_wire::encode(&event);
        if tx.send(frame).is_err() {
            self.forget(to).await;
            return Err(TransportError::SendFailed(to.clone(), "writer task exited".to_string()));
        }
        Ok(())
    }
}
