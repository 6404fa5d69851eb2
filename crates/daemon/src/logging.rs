// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging setup (SPEC_FULL.md §2.1 "Logging / tracing"): a
//! rolling file appender plus an env-filter, in the teacher's
//! `setup_logging` style (`oj-daemon::main::setup_logging`).

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::DaemonError;

/// Initialize the global `tracing` subscriber. The returned guard must be
/// held for the lifetime of the process — dropping it flushes and closes
/// the non-blocking file writer.
pub fn init(log_dir: &Path, default_level: &str) -> Result<tracing_appender::non_blocking::WorkerGuard, DaemonError> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "dao.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(guard)
}
