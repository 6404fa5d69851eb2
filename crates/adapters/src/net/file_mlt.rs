// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A file-backed `MltClient`. The file is a flat
//! TOML table of `"<subtree inode>" = "<peer addr>"` entries, loaded once
//! at startup; `record_move` updates the in-memory copy and best-effort
//! rewrites the file so a restart picks up the moved owner without
//! needing the real MLT service. The DAO itself never opens this file —
//! every lookup goes through this collaborator, so a retry after
//! `NotFound` just reconsults it.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use dao_core::subtree::{PeerAddr, SubtreeEntry};

use crate::error::MltError;
use crate::mlt::MltClient;

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct MltFile {
    #[serde(flatten)]
    owners: HashMap<String, String>,
}

pub struct FileMltClient {
    path: PathBuf,
    owners: RwLock<HashMap<SubtreeEntry, PeerAddr>>,
}

impl FileMltClient {
    /// Load `path` if it exists; an absent file starts with an empty
    /// table rather than failing. "No MLT available" is this
    /// collaborator's own fatal condition to raise on lookup, not a
    /// constructor-time one.
    pub async fn load(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let owners = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => parse(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err),
        };
        Ok(Self { path, owners: RwLock::new(owners) })
    }

    async fn persist(&self, owners: &HashMap<SubtreeEntry, PeerAddr>) {
        let file = MltFile { owners: owners.iter().map(|(k, v)| (k.0.to_string(), v.as_str().to_string())).collect() };
        match toml::to_string_pretty(&file) {
            Ok(contents) => {
                if let Err(err) = tokio::fs::write(&self.path, contents).await {
                    warn!(path = %self.path.display(), error = %err, "failed to persist MLT file after a move");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize MLT file"),
        }
    }
}

fn parse(contents: &str) -> HashMap<SubtreeEntry, PeerAddr> {
    let file: MltFile = match toml::from_str(contents) {
        Ok(f) => f,
        Err(err) => {
            warn!(error = %err, "MLT file failed to parse, starting with an empty table");
            return HashMap::new();
        }
    };
    file.owners
        .into_iter()
        .filter_map(|(k, v)| k.parse::<u64>().ok().map(|inode| (SubtreeEntry(inode), PeerAddr::new(v))))
        .collect()
}

#[async_trait]
impl MltClient for FileMltClient {
    async fn owner_of(&self, subtree: SubtreeEntry) -> Result<PeerAddr, MltError> {
        self.owners.read().await.get(&subtree).cloned().ok_or(MltError::NotFound(subtree))
    }

    async fn record_move(&self, subtree: SubtreeEntry, new_owner: PeerAddr) {
        let snapshot = {
            let mut guard = self.owners.write().await;
            guard.insert(subtree, new_owner);
            guard.clone()
        };
        self.persist(&snapshot).await;
    }
}

#[cfg(test)]
#[path = "file_mlt_tests.rs"]
mod tests;
