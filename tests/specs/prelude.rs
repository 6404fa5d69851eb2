// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the spec-level integration suite.
//!
//! These tests exercise dispatcher + workers + journal + recovery wired
//! together through the same public surface `dao-daemon` and `dao-harness`
//! use, rather than calling `dao-engine`'s private protocol functions
//! directly (those have their own focused unit tests inside that crate).

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

pub use dao_adapters::memory::{ExecutorScript, InMemoryExecutor, InMemoryMlt, InMemoryNetwork};
use dao_core::clock::SystemClock;
use dao_core::subtree::PeerAddr;
pub use dao_engine::{run_request_worker, run_timeout_worker, ClientResult, Dao, EngineConfig};
pub use dao_storage::JournalGateway;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Short, fast-failing timeouts so these tests don't wait out the
/// production defaults to observe a retry or an
/// abort.
pub fn fast_config() -> EngineConfig {
    EngineConfig { tpc_rel_timeout_ms: 30, mtpc_rel_timeout_ms: 30, ooe_rel_timeout_ms: 30, overall_timeout_ms: 5_000, dao_min_sleep_time_secs: 0 }
}

/// A live node: a full `Dao<SystemClock>` over in-memory collaborators,
/// already open for traffic, with its request and timeout workers
/// spawned. Dropping `_workers` aborts them.
pub struct LiveNode {
    pub addr: PeerAddr,
    pub dao: Arc<Dao<SystemClock>>,
    pub executor: InMemoryExecutor,
    pub mlt: InMemoryMlt,
    pub journal: Arc<dyn JournalGateway>,
    pub client_results: mpsc::Receiver<ClientResult>,
    _workers: Vec<JoinHandle<()>>,
}

pub async fn live_node(network: &InMemoryNetwork, addr: &str, config: EngineConfig) -> LiveNode {
    let journal: Arc<dyn JournalGateway> = Arc::new(dao_storage::InMemoryJournalGateway::new());
    live_node_with_journal(network, addr, config, journal).await
}

/// A node whose journal is a caller-supplied `JournalGateway` (used for the
/// file-backed crash-recovery scenario) rather than a fresh in-memory one.
pub async fn live_node_with_journal(
    network: &InMemoryNetwork,
    addr: &str,
    config: EngineConfig,
    journal: Arc<dyn JournalGateway>,
) -> LiveNode {
    let peer = PeerAddr::new(addr);
    let (inbound_rx, transport) = network.join(peer.clone()).await;
    let executor = InMemoryExecutor::new();
    let mlt = InMemoryMlt::new();

    let (dao, client_results) = Dao::new(
        peer.clone(),
        config,
        Arc::clone(&journal),
        Arc::new(mlt.clone()),
        Arc::new(executor.clone()),
        Arc::new(transport),
        SystemClock,
    );
    let dao = Arc::new(dao);
    dao.mark_recovery_complete();

    let request_worker = tokio::spawn(run_request_worker(Arc::clone(&dao), inbound_rx));
    let timeout_worker = tokio::spawn(run_timeout_worker(Arc::clone(&dao)));

    LiveNode { addr: peer, dao, executor, mlt, journal, client_results, _workers: vec![request_worker, timeout_worker] }
}

/// Just an inbox on the network with no `Dao` behind it: a stand-in peer
/// used to observe what a real participant/coordinator would have
/// received, without running the full engine on that side.
pub async fn observer(network: &InMemoryNetwork, addr: &str) -> (PeerAddr, mpsc::Receiver<(PeerAddr, dao_wire::Event)>) {
    let peer = PeerAddr::new(addr);
    let (rx, _transport) = network.join(peer.clone()).await;
    (peer, rx)
}

pub async fn wait_for_client_result(rx: &mut mpsc::Receiver<ClientResult>) -> ClientResult {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("client result did not arrive within 2s")
        .expect("client result channel closed before a result arrived")
}

pub async fn wait_for_event(rx: &mut mpsc::Receiver<(PeerAddr, dao_wire::Event)>) -> (PeerAddr, dao_wire::Event) {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("event did not arrive within 2s")
        .expect("event channel closed before an event arrived")
}

/// Poll `cond` until it reports true or 2s elapse, for assertions that
/// depend on background workers draining a channel rather than on a
/// direct reply this test can `recv()` for.
pub async fn wait_until<F, Fut>(mut cond: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if cond().await {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("condition did not become true within 2s");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn success() -> dao_adapters::ExecutorOutcome {
    dao_adapters::ExecutorOutcome::ExecutionSuccessful { next_participant: None }
}

pub fn failure() -> dao_adapters::ExecutorOutcome {
    dao_adapters::ExecutorOutcome::ExecutionUnsuccessful
}

pub fn script_success() -> ExecutorScript {
    ExecutorScript { do_outcome: Some(success()), ..Default::default() }
}

pub fn script_failure() -> ExecutorScript {
    ExecutorScript { do_outcome: Some(failure()), ..Default::default() }
}
