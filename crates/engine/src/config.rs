// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The recognized configuration constants.

use std::time::Duration;

/// Per-step retry deadlines, the overall in-memory lifetime bound, and the
/// timeout-worker polling granularity, all named in spec.md §6. `mlt_path`
/// itself is consulted only through the `MltClient` collaborator (spec.md
/// §2) — this crate never opens it directly.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tpc_rel_timeout_ms: u64,
    pub mtpc_rel_timeout_ms: u64,
    pub ooe_rel_timeout_ms: u64,
    pub overall_timeout_ms: u64,
    pub dao_min_sleep_time_secs: u64,
}

impl EngineConfig {
    pub fn tpc_rel_timeout(&self) -> Duration {
        Duration::from_millis(self.tpc_rel_timeout_ms)
    }

    pub fn mtpc_rel_timeout(&self) -> Duration {
        Duration::from_millis(self.mtpc_rel_timeout_ms)
    }

    pub fn ooe_rel_timeout(&self) -> Duration {
        Duration::from_millis(self.ooe_rel_timeout_ms)
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }

    pub fn min_sleep(&self) -> Duration {
        Duration::from_secs(self.dao_min_sleep_time_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tpc_rel_timeout_ms: 5_000,
            mtpc_rel_timeout_ms: 5_000,
            ooe_rel_timeout_ms: 5_000,
            overall_timeout_ms: 60_000,
            dao_min_sleep_time_secs: 1,
        }
    }
}
