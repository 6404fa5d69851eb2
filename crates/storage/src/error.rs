// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal failure taxonomy.

use dao_core::operation_id::OperationId;
use dao_core::subtree::SubtreeEntry;
use thiserror::Error;

/// Failure appending to or reading a journal.
///
/// `WrongJournalKey`, `SubtreeNotExisting`, `SalNotSet`, and `NoMlt` are the
/// four journal error kinds spec.md §7 names; `Io`/`Corrupt` cover the
/// concrete file-backed implementation's failure modes, which the source's
/// abstraction doesn't distinguish but which a Rust `Result` must surface
/// somehow rather than panicking.
#[derive(Debug, Error)]
pub enum JournalError {
    /// The caller addressed the wrong journal for this operation; the real
    /// key is looked up via the open-operations index and the append
    /// retried once.
    #[error("wrong journal key for operation {op_id}: addressed {addressed}")]
    WrongJournalKey { op_id: OperationId, addressed: SubtreeEntry },

    /// The journal key does not correspond to any subtree this server
    /// currently owns.
    #[error("subtree entry {0} has no journal")]
    SubtreeNotExisting(SubtreeEntry),

    /// The storage allocator has not assigned a subtree-local id range;
    /// fatal per spec.md §7 ("surface as fatal; caller is expected to
    /// repair and the operation will be recovered at next start").
    #[error("storage allocator not initialized for subtree {0}")]
    SalNotSet(SubtreeEntry),

    /// No MLT available to resolve a journal key; fatal, same as above.
    #[error("no MLT available to resolve journal key")]
    NoMlt,

    /// A record was appended after a terminal record for the same op_id.
    #[error("journal for operation {0} already holds a terminal record")]
    AlreadyTerminal(OperationId),

    #[error("journal io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal record corrupt: {0}")]
    Corrupt(String),
}
