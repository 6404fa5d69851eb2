// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-level configuration: a `toml`-deserialized [`Config`] covering
//! the engine's recognized constants plus the process-level settings
//! needed to actually run the `daod` binary (bind address, journal
//! directory, executor/MLT addresses, log directory/level).

use std::path::{Path, PathBuf};

use dao_engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::DaemonError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// This server's own address, as peers and the MLT know it.
    pub self_addr: String,
    /// Address this server's peer transport listens on.
    pub bind_addr: String,
    /// Address of the filesystem executor this server's `ExecutorBridge`
    /// talks to.
    pub executor_addr: String,
    /// Directory holding per-subtree and server-global journal files.
    pub journal_dir: PathBuf,
    /// Path to the flat-file MLT.
    pub mlt_path: PathBuf,
    /// Directory the daemon writes its rolling log file to.
    pub log_dir: PathBuf,
    /// `tracing-subscriber` env-filter directive, overridden by `RUST_LOG`
    /// if set.
    pub log_level: String,

    pub tpc_rel_timeout_ms: u64,
    pub mtpc_rel_timeout_ms: u64,
    pub ooe_rel_timeout_ms: u64,
    pub overall_timeout_ms: u64,
    pub dao_min_sleep_time_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            self_addr: "127.0.0.1:7100".to_string(),
            bind_addr: "127.0.0.1:7100".to_string(),
            executor_addr: "127.0.0.1:7200".to_string(),
            journal_dir: PathBuf::from("./dao-journals"),
            mlt_path: PathBuf::from("./dao-mlt.toml"),
            log_dir: PathBuf::from("./dao-logs"),
            log_level: "info".to_string(),
            tpc_rel_timeout_ms: engine.tpc_rel_timeout_ms,
            mtpc_rel_timeout_ms: engine.mtpc_rel_timeout_ms,
            ooe_rel_timeout_ms: engine.ooe_rel_timeout_ms,
            overall_timeout_ms: engine.overall_timeout_ms,
            dao_min_sleep_time_secs: engine.dao_min_sleep_time_secs,
        }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults for any field the
    /// file omits (the `#[serde(default)]` struct-level attribute). An
    /// absent file is not an error — a freshly deployed node is expected
    /// to start from the built-in defaults.
    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|e| DaemonError::Config(e.to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(DaemonError::Io(err)),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tpc_rel_timeout_ms: self.tpc_rel_timeout_ms,
            mtpc_rel_timeout_ms: self.mtpc_rel_timeout_ms,
            ooe_rel_timeout_ms: self.ooe_rel_timeout_ms,
            overall_timeout_ms: self.overall_timeout_ms,
            dao_min_sleep_time_secs: self.dao_min_sleep_time_secs,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
