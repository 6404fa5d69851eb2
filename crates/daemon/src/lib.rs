// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dao-daemon: process wiring for one MDS's DAO instance. One DAO
//! instance runs per MDS, realized as one owned `Dao` root object rather
//! than a literal process-wide singleton.
//!
//! This crate is the only place that constructs concrete collaborator
//! implementations (`FileJournalGateway`, `FileMltClient`,
//! `TcpExecutorClient`, `TcpTransport`) and wires them into a `Dao`; the
//! `dao-engine` crate itself never depends on any of them.

pub mod config;
pub mod error;
pub mod logging;
pub mod result_forwarder;

pub use config::Config;
pub use error::DaemonError;
