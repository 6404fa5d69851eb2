// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn unseeded_subtree_is_not_found() {
    let mlt = InMemoryMlt::new();
    let err = mlt.owner_of(SubtreeEntry(1)).await.unwrap_err();
    assert_eq!(err, MltError::NotFound(SubtreeEntry(1)));
}

#[tokio::test]
async fn seeded_subtree_resolves_to_its_owner() {
    let mlt = InMemoryMlt::new();
    mlt.seed(SubtreeEntry(1), PeerAddr::new("p1:9000")).await;
    assert_eq!(mlt.owner_of(SubtreeEntry(1)).await.unwrap(), PeerAddr::new("p1:9000"));
}

#[tokio::test]
async fn record_move_updates_the_owner() {
    let mlt = InMemoryMlt::new();
    mlt.seed(SubtreeEntry(1), PeerAddr::new("p1:9000")).await;
    mlt.record_move(SubtreeEntry(1), PeerAddr::new("p2:9000")).await;
    assert_eq!(mlt.owner_of(SubtreeEntry(1)).await.unwrap(), PeerAddr::new("p2:9000"));
}
