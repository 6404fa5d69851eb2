// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The inbound half of the peer transport: accept connections, read the
//! one-time handshake frame each `TcpTransport` sends on connect, then
//! decode every subsequent frame as an `Event` and push `(PeerAddr,
//! Event)` onto the request worker's channel, its only consumer.

use futures::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LengthDelimitedCodec};
use tracing::{debug, info, warn};

use dao_core::subtree::PeerAddr;
use dao_wire::Event;

/// Bind `bind_addr` and forward every decoded inbound `Event` to `tx`
/// until the listener is dropped or binding fails. Runs forever;
/// `dao-daemon` spawns this as one of its long-lived tasks.
pub async fn run_tcp_listener(bind_addr: &str, tx: mpsc::Sender<(PeerAddr, Event)>) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    info!(bind_addr, "tcp listener bound, accepting peer connections");
    loop {
        let (stream, remote) = match listener.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(error = %err, "tcp listener accept failed, continuing");
                continue;
            }
        };
        debug!(remote = %remote, "accepted peer connection");
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, tx).await {
                warn!(remote = %remote, error = %err, "peer connection ended");
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, tx: mpsc::Sender<(PeerAddr, Event)>) -> std::io::Result<()> {
    let mut framed = FramedRead::new(stream, LengthDelimitedCodec::new());

    let Some(first) = framed.next().await else { return Ok(()) };
    let first = first?;
    let sender = PeerAddr::new(String::from_utf8_lossy(&first).into_owned());

    while let Some(frame) = framed.next().await {
        let frame = frame?;
        match dao_wire::decode(&frame) {
            Ok(event) => {
                if tx.send((sender.clone(), event)).await.is_err() {
                    warn!("request worker channel closed, dropping remaining frames from this connection");
                    return Ok(());
                }
            }
            Err(err) => {
                warn!(sender = %sender, error = %err, "dropping unparsable frame");
            }
        }
    }
    Ok(())
}
