// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timeout queue entries.
//!
//! A [`TimeoutEntry`] is pushed whenever the engine enters a status that
//! expects a response within `overall_deadline`. The scheduler orders
//! entries by `deadline` in a min-heap; on pop, the engine compares
//! `recorded_status` against the operation's *current* status and only acts
//! if they still match — this is what makes a stale timer for an operation
//! that has already advanced past the status it was armed for a no-op,
//! without needing to cancel timers explicitly on every transition.

use crate::operation_id::OperationId;
use crate::status::Status;
use std::cmp::Ordering;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct TimeoutEntry {
    pub op_id: OperationId,
    pub deadline: Instant,
    /// The status this operation was in when the timer was armed. The
    /// timeout only fires its action if the operation's status is still
    /// this value when the deadline is reached.
    pub recorded_status: Status,
}

impl TimeoutEntry {
    pub fn new(op_id: OperationId, deadline: Instant, recorded_status: Status) -> Self {
        Self { op_id, deadline, recorded_status }
    }

    /// Whether this entry should still fire, given the operation's current
    /// status. `None` means the operation is gone (completed and removed
    /// from the store) — the timer is stale and should be dropped.
    pub fn is_stale(&self, current_status: Option<Status>) -> bool {
        current_status != Some(self.recorded_status)
    }
}

impl PartialEq for TimeoutEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline
    }
}

impl Eq for TimeoutEntry {}

impl PartialOrd for TimeoutEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeoutEntry {
    /// Reversed so a `BinaryHeap<TimeoutEntry>` pops the *earliest* deadline
    /// first rather than the latest.
    fn cmp(&self, other: &Self) -> Ordering {
        other.deadline.cmp(&self.deadline)
    }
}

#[cfg(test)]
#[path = "timeout_entry_tests.rs"]
mod tests;
