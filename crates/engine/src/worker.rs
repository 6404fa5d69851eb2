// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The long-lived background workers: "Result worker",
//! "Request worker", "Timeout worker". This crate's "Result worker"
//! collapses into the synchronous, awaited executor calls already made
//! inline by the protocol engines (`ExecutorClient::do_request` et al.
//! are `async fn`s awaited directly inside `protocol::tpc`/`mtpc`/`ooe`),
//! so there is no separate executor-result channel to drain here; see
//! DESIGN.md. Only the request worker and the timeout worker are real
//! tasks in this crate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, warn};

use dao_core::clock::Clock;
use dao_core::subtree::PeerAddr;
use dao_wire::Event;

use crate::dao::Dao;
use crate::dispatcher::dispatch_peer_event;

/// Drain inbound peer events and dispatch each one in turn (spec.md §5
/// "Request worker"). Runs until `rx` is closed (the transport/network
/// layer shut down).
pub async fn run_request_worker<C: Clock>(dao: Arc<Dao<C>>, mut rx: mpsc::Receiver<(PeerAddr, Event)>) {
    while let Some((sender, event)) = rx.recv().await {
        if let Err(err) = dispatch_peer_event(&dao, sender, event).await {
            error!(error = %err, "dispatcher failed to process an inbound event");
        }
    }
    warn!("request worker exiting, inbound channel closed");
}

/// Poll the timeout priority queue at `DAO_MIN_SLEEP_TIME` granularity
///. Runs forever; callers
/// `tokio::spawn` it and hold the `JoinHandle` for shutdown.
pub async fn run_timeout_worker<C: Clock>(dao: Arc<Dao<C>>) {
    let granularity = dao.config().min_sleep().max(Duration::from_millis(1));
    loop {
        tokio::time::sleep(granularity).await;
        drain_due_timeouts(&dao).await;
    }
}

async fn drain_due_timeouts<C: Clock>(dao: &Dao<C>) {
    loop {
        let mut guard = dao.state.lock().await;
        let due = guard.timeouts.peek().is_some_and(|entry| dao.clock.now() >= entry.deadline);
        if !due {
            return;
        }
        let Some(entry) = guard.timeouts.pop() else { return };
        let current_status = guard.store.get(entry.op_id).map(|op| op.status);
        if entry.is_stale(current_status) {
            continue;
        }
        let protocol = guard.store.get(entry.op_id).map(|op| op.protocol);
        let Some(protocol) = protocol else { continue };
        if let Err(err) = crate::protocol::route_timeout(dao, &mut guard, entry.op_id, protocol, entry.recorded_status).await {
            error!(op_id = %entry.op_id, error = %err, "timeout handler failed");
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
