// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test harness construction for the protocol engine, dispatcher,
//! recovery, and worker test modules. Not exported outside `#[cfg(test)]`.

use std::sync::Arc;

use dao_adapters::memory::{InMemoryExecutor, InMemoryMlt, InMemoryNetwork, InMemoryTransport};
use dao_core::clock::FakeClock;
use dao_core::subtree::PeerAddr;
use dao_storage::InMemoryJournalGateway;
use tokio::sync::mpsc;

use crate::client_result::ClientResult;
use crate::config::EngineConfig;
use crate::dao::Dao;

/// A fully-wired `Dao<FakeClock>` over in-memory collaborators, for tests
/// that need to drive protocol transitions without touching the network,
/// a real filesystem, or wall-clock time.
pub(crate) struct Harness {
    pub dao: Dao<FakeClock>,
    pub clock: FakeClock,
    pub executor: InMemoryExecutor,
    pub mlt: InMemoryMlt,
    pub network: InMemoryNetwork,
    pub client_results: mpsc::Receiver<ClientResult>,
}

/// Build a [`Harness`] for a server at `self_addr`, plus the raw inbound
/// `(sender, event)` receiver its `InMemoryTransport` was registered
/// under (for tests that exercise the dispatcher/worker plumbing
/// end-to-end rather than calling protocol functions directly).
pub(crate) async fn harness(self_addr: &str) -> (Harness, mpsc::Receiver<(PeerAddr, dao_wire::Event)>) {
    harness_on(&InMemoryNetwork::new(), self_addr).await
}

/// Same as [`harness`], but joins a network the caller already created —
/// for multi-node tests where more than one server must share a switchboard.
pub(crate) async fn harness_on(network: &InMemoryNetwork, self_addr: &str) -> (Harness, mpsc::Receiver<(PeerAddr, dao_wire::Event)>) {
    let (rx, transport) = network.join(PeerAddr::new(self_addr)).await;
    let executor = InMemoryExecutor::new();
    let mlt = InMemoryMlt::new();
    let journal: Arc<InMemoryJournalGateway> = Arc::new(InMemoryJournalGateway::new());
    let clock = FakeClock::new();
    let (dao, client_results) = Dao::new(
        PeerAddr::new(self_addr),
        EngineConfig::default(),
        journal,
        Arc::new(mlt.clone()),
        Arc::new(executor.clone()),
        Arc::new(transport),
        clock.clone(),
    );
    (Harness { dao, clock, executor, mlt, network: network.clone(), client_results }, rx)
}

impl Harness {
    /// Shorthand for `dao.mark_recovery_complete()`, since every
    /// dispatcher/worker test needs it and the name reads oddly repeated
    /// at every call site.
    pub(crate) fn open_for_traffic(&self) {
        self.dao.mark_recovery_complete();
    }
}
