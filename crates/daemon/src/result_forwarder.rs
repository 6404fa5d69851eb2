// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forwards [`ClientResult`]s to the external queue they belong on:
//! routed to the load-balancing queue if `type` is
//! `MoveSubtree`/`OoeLbTest`, the metadata queue otherwise. Both queues
//! are out-of-scope external collaborators; this process only needs to
//! hand each result to the right one. Lacking a real queue to dial, this
//! logs the routed outcome at `info!` — the integration point a
//! deployment wires a real queue client into.

use dao_engine::{ClientResult, ResultQueue};
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(mut rx: mpsc::Receiver<ClientResult>) {
    while let Some(result) = rx.recv().await {
        let queue = match result.queue {
            ResultQueue::LoadBalancing => "load_balancing",
            ResultQueue::Metadata => "metadata",
        };
        info!(
            op_id = %result.op_id,
            protocol = %result.protocol,
            success = result.success,
            queue,
            "client result routed"
        );
    }
}
