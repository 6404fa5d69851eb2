// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dao-adapters: the external-collaborator boundary for the distributed
//! atomic operations coordinator — the MLT, the filesystem executor, and
//! peer transport.
//!
//! Every collaborator is an `async_trait`, in the teacher's adapter-trait
//! style (`oj-adapters::agent::AgentAdapter`): the engine crate depends
//! only on [`MltClient`], [`ExecutorClient`], and [`Transport`], never on
//! a concrete implementation. The `test-support` feature additionally
//! exports one in-memory implementation of each, used by this crate's own
//! tests, `dao-engine`'s tests, and the `dao-harness` binary — not wired
//! into a real deployment.

pub mod error;
pub mod executor;
pub mod mlt;
pub mod net;
pub mod transport;

#[cfg(feature = "test-support")]
pub mod memory;

pub use error::{MltError, TransportError};
pub use executor::{ExecutorClient, ExecutorOutcome};
pub use mlt::MltClient;
pub use transport::Transport;
