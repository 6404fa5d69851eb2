// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dao_core::subtree::{PeerAddr, SubtreeEntry};
use tokio::sync::Mutex;

use crate::error::MltError;
use crate::mlt::MltClient;

/// An [`MltClient`] backed by a plain in-process map, for tests and
/// `dao-harness`. Never consults a real MLT file; `record_move` is how
/// test setups and the harness simulate ownership changes.
#[derive(Clone, Default)]
pub struct InMemoryMlt {
    owners: Arc<Mutex<HashMap<SubtreeEntry, PeerAddr>>>,
}

impl InMemoryMlt {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, subtree: SubtreeEntry, owner: PeerAddr) {
        self.owners.lock().await.insert(subtree, owner);
    }
}

#[async_trait]
impl MltClient for InMemoryMlt {
    async fn owner_of(&self, subtree: SubtreeEntry) -> Result<PeerAddr, MltError> {
        self.owners.lock().await.get(&subtree).cloned().ok_or(MltError::NotFound(subtree))
    }

    async fn record_move(&self, subtree: SubtreeEntry, new_owner: PeerAddr) {
        self.owners.lock().await.insert(subtree, new_owner);
    }
}

#[cfg(test)]
#[path = "mlt_tests.rs"]
mod tests;
