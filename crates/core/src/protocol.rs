// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three coordination protocols.

use crate::simple_display;

/// Which protocol an operation runs under. Selected once, at
/// `start_coordinator`/`start_participant` time, from `participants.len()`:
/// `0` (first OOE hop) or an explicit OOE chain selects [`ProtocolKind::Ooe`],
/// `1` selects [`ProtocolKind::Mtpc`], `2+` selects [`ProtocolKind::Tpc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ProtocolKind {
    /// Two-Phase Commit: `participants.len() >= 2`.
    Tpc,
    /// Modified Two-Phase Commit: exactly one participant, no vote phase.
    Mtpc,
    /// Ordered Operation Execution: a pipelined chain of participants.
    Ooe,
}

simple_display! {
    ProtocolKind {
        Tpc => "tpc",
        Mtpc => "mtpc",
        Ooe => "ooe",
    }
}
