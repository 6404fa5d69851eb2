// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation identity.
//!
//! An [`OperationId`] is a 64-bit value, unique within the cluster, and
//! never zero — zero is reserved by the wire framing (`dao-wire`) to mean
//! "not-a-request".

use std::collections::hash_map::{DefaultHasher, RandomState};
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for an in-flight or completed operation.
///
/// `OperationId(0)` is reserved and never produced by [`OperationIdGenerator`];
/// it is used only at the transport framing layer to mean "not-a-request".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub u64);

impl OperationId {
    /// The reserved "not-a-request" sentinel.
    pub const NONE: OperationId = OperationId(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collision-resistant generator of [`OperationId`] values.
///
/// Combines a per-process random salt (drawn from the OS via
/// [`RandomState`], which already seeds itself unpredictably) with a
/// monotonic counter so that two generators in the same process — or two
/// processes with different salts — are exceedingly unlikely to collide,
/// without pulling in an external CSPRNG dependency.
pub struct OperationIdGenerator {
    salt: u64,
    counter: AtomicU64,
}

impl OperationIdGenerator {
    pub fn new() -> Self {
        let salt = RandomState::new().build_hasher().finish();
        Self { salt, counter: AtomicU64::new(1) }
    }

    /// Produce the next operation id. Never returns [`OperationId::NONE`].
    pub fn next(&self) -> OperationId {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = DefaultHasher::new();
        self.salt.hash(&mut hasher);
        count.hash(&mut hasher);
        let raw = hasher.finish();
        OperationId(if raw == 0 { 1 } else { raw })
    }
}

impl Default for OperationIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "operation_id_tests.rs"]
mod tests;
