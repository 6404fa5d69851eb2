// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dao-harness`: an in-process multi-node smoke-test cluster (SPEC_FULL.md
//! §4.10). This binary is test/demo tooling, not a replacement for the
//! excluded admin CLI — it exists only to exercise TPC, MTPC, and OOE
//! end-to-end over an in-memory transport and print the resulting client
//! ACK/NACK for each.
//!
//! Every node here is a real `Dao<SystemClock>` wired to the same
//! collaborator implementations `dao-daemon` uses in production, except
//! for the `test-support` in-memory `Transport`/`MltClient`/`ExecutorClient`
//! (`dao-adapters::memory`) in place of TCP sockets, a real MLT file, and a
//! real filesystem executor — the same substitution this workspace's own
//! integration tests make.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use dao_adapters::memory::{ExecutorScript, InMemoryExecutor, InMemoryMlt, InMemoryNetwork};
use dao_core::clock::SystemClock;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{PeerAddr, Subtree, SubtreeEntry};
use dao_engine::{run_request_worker, run_timeout_worker, ClientResult, Dao, EngineConfig};
use dao_storage::InMemoryJournalGateway;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "dao-harness", about = "In-process multi-node DAO smoke test")]
struct Args {
    /// Run each demo this many times back to back, to shake out races in
    /// the in-memory transport rather than proving anything about a single
    /// run.
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

/// One simulated MDS node: its `Dao`, the scripting handles for its
/// in-memory collaborators, and the two worker task handles spawned for it.
struct Node {
    addr: PeerAddr,
    dao: Arc<Dao<SystemClock>>,
    executor: InMemoryExecutor,
    mlt: InMemoryMlt,
    client_results: mpsc::Receiver<ClientResult>,
}

async fn spawn_node(network: &InMemoryNetwork, addr: &str) -> Node {
    let addr = PeerAddr::new(addr);
    let (inbound_rx, transport) = network.join(addr.clone()).await;
    let executor = InMemoryExecutor::new();
    let mlt = InMemoryMlt::new();
    let journal = Arc::new(InMemoryJournalGateway::new());

    let (dao, client_results) = Dao::new(
        addr.clone(),
        EngineConfig::default(),
        journal,
        Arc::new(mlt.clone()),
        Arc::new(executor.clone()),
        Arc::new(transport),
        SystemClock,
    );
    let dao = Arc::new(dao);

    // No journals to replay in a fresh in-memory cluster; recovery is
    // trivially complete immediately.
    dao.mark_recovery_complete();

    tokio::spawn(run_request_worker(Arc::clone(&dao), inbound_rx));
    tokio::spawn(run_timeout_worker(Arc::clone(&dao)));

    Node { addr, dao, executor, mlt, client_results }
}

async fn await_result(node: &mut Node, label: &str) {
    match node.client_results.recv().await {
        Some(result) => info!(op_id = %result.op_id, protocol = %result.protocol, success = result.success, "{label}: client result"),
        None => info!("{label}: client result channel closed before a result arrived"),
    }
}

/// Two-participant TPC happy path: both participants vote to commit.
async fn demo_tpc(network: &InMemoryNetwork) -> anyhow::Result<()> {
    info!("--- TPC demo: coordinator + 2 participants, both vote commit ---");
    let mut coordinator = spawn_node(network, "mds-tpc-coord").await;
    let participant_a = spawn_node(network, "mds-tpc-a").await;
    let participant_b = spawn_node(network, "mds-tpc-b").await;

    let participants = vec![
        Subtree::new(participant_a.addr.clone(), SubtreeEntry(1)),
        Subtree::new(participant_b.addr.clone(), SubtreeEntry(2)),
    ];
    let op_id = coordinator
        .dao
        .start_coordinator(OperationType::Rename, b"rename demo payload".to_vec(), participants, SubtreeEntry(0))
        .await?;
    info!(%op_id, "tpc: coordinator dispatched TPCOpReq to both participants");

    await_result(&mut coordinator, "tpc").await;
    Ok(())
}

/// Single-participant MTPC: no vote phase, the one participant either
/// executes and acks or rejects outright.
async fn demo_mtpc(network: &InMemoryNetwork) -> anyhow::Result<()> {
    info!("--- MTPC demo: coordinator + 1 participant ---");
    let mut coordinator = spawn_node(network, "mds-mtpc-coord").await;
    let participant = spawn_node(network, "mds-mtpc-a").await;

    let participants = vec![Subtree::new(participant.addr.clone(), SubtreeEntry(1))];
    let op_id = coordinator
        .dao
        .start_coordinator(OperationType::SetAttr, b"setattr demo payload".to_vec(), participants, SubtreeEntry(0))
        .await?;
    info!(%op_id, "mtpc: coordinator dispatched MTPCOpReq to its one participant");

    await_result(&mut coordinator, "mtpc").await;
    Ok(())
}

/// Three-node OOE pipeline: first node has no participant list
/// (`participants.len() == 0`, spec.md §4.9's first-hop convention) and
/// discovers the next hop lazily from its own executor's scripted
/// `next_participant`, which the middle and last node's executors also
/// supply, ending with `next_participant: None` at the last hop.
async fn demo_ooe(network: &InMemoryNetwork) -> anyhow::Result<()> {
    info!("--- OOE demo: 3-node pipeline, first -> middle -> last ---");
    let mut first = spawn_node(network, "mds-ooe-first").await;
    let middle = spawn_node(network, "mds-ooe-middle").await;
    let last = spawn_node(network, "mds-ooe-last").await;

    let first_entry = SubtreeEntry(10);
    let middle_entry = SubtreeEntry(11);
    let last_entry = SubtreeEntry(12);

    first.mlt.seed(middle_entry, middle.addr.clone()).await;
    middle.mlt.seed(last_entry, last.addr.clone()).await;

    let op_id = first
        .dao
        .start_coordinator(OperationType::OoeLbTest, b"ooe demo payload".to_vec(), Vec::new(), first_entry)
        .await?;

    first
        .executor
        .script(op_id, ExecutorScript { do_outcome: Some(next_hop(middle_entry)), ..Default::default() })
        .await;
    middle
        .executor
        .script(op_id, ExecutorScript { do_outcome: Some(next_hop(last_entry)), ..Default::default() })
        .await;
    // `last` uses the default script: `ExecutionSuccessful { next_participant: None }`,
    // which ends the chain and acknowledges back to `middle`, then `first`.

    info!(%op_id, "ooe: first hop dispatched, chain should run first -> middle -> last -> ack back");

    await_result(&mut first, "ooe").await;
    Ok(())
}

fn next_hop(entry: SubtreeEntry) -> dao_adapters::ExecutorOutcome {
    dao_adapters::ExecutorOutcome::ExecutionSuccessful { next_participant: Some(entry) }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!(repeat = args.repeat, "dao-harness starting");

    for round in 1..=args.repeat {
        info!(round, "=== starting demo round ===");
        // Each demo gets its own switchboard and nodes: the point of this
        // harness is a readable run-through of each protocol, not a shared
        // long-lived cluster.
        let tpc_network = InMemoryNetwork::new();
        demo_tpc(&tpc_network).await?;

        let mtpc_network = InMemoryNetwork::new();
        demo_mtpc(&mtpc_network).await?;

        let ooe_network = InMemoryNetwork::new();
        demo_ooe(&ooe_network).await?;

        // ClientResult delivery races the request worker's own dispatch;
        // give every node's spawned tasks a moment to settle before the
        // process exits or the next round's nodes are spawned.
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    info!("dao-harness done");
    Ok(())
}
