// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dao_core::operation_id::OperationId;

#[tokio::test]
async fn delivers_to_the_registered_peer() {
    let network = InMemoryNetwork::new();
    let (mut rx_a, _transport_a) = network.join(PeerAddr::new("a")).await;
    let (_rx_b, transport_b) = network.join(PeerAddr::new("b")).await;

    let event = Event::TpcAck { op_id: OperationId(1) };
    transport_b.send(&PeerAddr::new("a"), event.clone()).await.unwrap();

    let received = rx_a.recv().await.unwrap();
    assert_eq!(received, (PeerAddr::new("b"), event));
}

#[tokio::test]
async fn send_to_unregistered_peer_is_socket_not_found() {
    let network = InMemoryNetwork::new();
    let (_rx, transport) = network.join(PeerAddr::new("a")).await;

    let err = transport.send(&PeerAddr::new("ghost"), Event::TpcAck { op_id: OperationId(1) }).await.unwrap_err();
    assert_eq!(err, TransportError::SocketNotFound(PeerAddr::new("ghost")));
}
