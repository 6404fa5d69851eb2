// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn missing_file_starts_with_an_empty_table() {
    let dir = tempdir().unwrap();
    let client = FileMltClient::load(dir.path().join("mlt.toml")).await.unwrap();
    let err = client.owner_of(SubtreeEntry(1)).await.unwrap_err();
    assert!(matches!(err, MltError::NotFound(s) if s == SubtreeEntry(1)));
}

#[tokio::test]
async fn loads_existing_entries_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mlt.toml");
    tokio::fs::write(&path, "\"7\" = \"host-a:9000\"\n").await.unwrap();

    let client = FileMltClient::load(&path).await.unwrap();
    let owner = client.owner_of(SubtreeEntry(7)).await.unwrap();
    assert_eq!(owner, PeerAddr::new("host-a:9000"));
}

#[tokio::test]
async fn record_move_updates_the_in_memory_table_and_rewrites_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mlt.toml");
    let client = FileMltClient::load(&path).await.unwrap();

    client.record_move(SubtreeEntry(3), PeerAddr::new("host-b:9000")).await;
    assert_eq!(client.owner_of(SubtreeEntry(3)).await.unwrap(), PeerAddr::new("host-b:9000"));

    // A fresh client loading the same path sees the persisted move.
    let reloaded = FileMltClient::load(&path).await.unwrap();
    assert_eq!(reloaded.owner_of(SubtreeEntry(3)).await.unwrap(), PeerAddr::new("host-b:9000"));
}

#[tokio::test]
async fn unparsable_file_falls_back_to_an_empty_table_rather_than_failing_the_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mlt.toml");
    tokio::fs::write(&path, "not valid toml {{{").await.unwrap();

    let client = FileMltClient::load(&path).await.unwrap();
    assert!(client.owner_of(SubtreeEntry(1)).await.is_err());
}
