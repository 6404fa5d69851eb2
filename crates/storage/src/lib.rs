// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dao-storage: durability for the distributed atomic operations
//! coordinator.
//!
//! Holds the `JournalGateway` (append-only per-subtree and server-global
//! logs) and the `OperationStore` (in-memory `op_id -> OpState` index plus
//! vote dedup). Neither type is internally synchronized; the coarse lock
//! named in spec.md §5 is applied by `dao-engine::Dao`, which owns the
//! `OperationStore` behind a `tokio::sync::Mutex`.

mod error;
mod file_journal;
mod journal;
mod journal_record;
mod memory_journal;
mod operation_store;

pub use error::JournalError;
pub use file_journal::FileJournalGateway;
pub use journal::JournalGateway;
pub use journal_record::{JournalPayload, JournalRecord};
pub use memory_journal::InMemoryJournalGateway;
pub use operation_store::OperationStore;
