// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wiring error taxonomy (SPEC_FULL.md §2.1 "Error handling"):
//! typed per-crate errors bubble up to here and are composed into
//! `anyhow::Error` at `main`, matching the teacher's
//! `oj-daemon::LifecycleError` pattern of one error enum the binary's
//! `main` logs and exits non-zero on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("journal gateway error: {0}")]
    Journal(#[from] dao_storage::JournalError),

    #[error("engine error: {0}")]
    Engine(#[from] dao_engine::EngineError),
}
