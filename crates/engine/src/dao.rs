// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Dao` root object (spec.md §4.9, §9 REDESIGN FLAGS: "process-wide
//! singletons with lazy init ... model as one owned root object
//! constructed at startup, with explicit references threaded through
//! constructors. No global mutable state.").
//!
//! One `Dao` is constructed per MDS process and owns every resource named
//! in spec.md §5 as shared under the single coarse lock: the
//! `OperationStore` and the timeout priority queue live together in
//! [`EngineState`], guarded by one `tokio::sync::Mutex` so a protocol
//! transition's journal append, outbound sends, and status update all
//! observe the same lock scope.

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use dao_adapters::{ExecutorClient, MltClient, Transport};
use dao_core::clock::{Clock, SystemClock};
use dao_core::op_state::OpState;
use dao_core::operation_id::{OperationId, OperationIdGenerator};
use dao_core::operation_type::OperationType;
use dao_core::protocol::ProtocolKind;
use dao_core::subtree::{PeerAddr, Subtree, SubtreeEntry};
use dao_core::timeout_entry::TimeoutEntry;
use dao_storage::{JournalGateway, OperationStore};

use crate::client_result::ClientResult;
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Everything mutated under the single coarse lock named in spec.md §5:
/// the `OperationStore` and the timeout priority queue. Bundled together
/// rather than behind two mutexes so "status must match recorded_status
/// to fire" and "a protocol step is atomic from the DAO's
/// perspective" hold without needing lock-ordering discipline.
pub struct EngineState {
    pub store: OperationStore,
    pub timeouts: BinaryHeap<TimeoutEntry>,
}

impl EngineState {
    fn new() -> Self {
        Self { store: OperationStore::new(), timeouts: BinaryHeap::new() }
    }
}

/// One DAO instance per MDS (spec.md §2: "One DAO instance runs per MDS
/// as a process-wide singleton" — realized here as one owned value, not
/// a singleton; see the REDESIGN FLAGS note above).
pub struct Dao<C: Clock = SystemClock> {
    pub(crate) self_addr: PeerAddr,
    pub(crate) config: EngineConfig,
    pub(crate) journal: Arc<dyn JournalGateway>,
    pub(crate) mlt: Arc<dyn MltClient>,
    pub(crate) executor: Arc<dyn ExecutorClient>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) clock: C,
    pub(crate) id_gen: OperationIdGenerator,
    pub(crate) state: Mutex<EngineState>,
    pub(crate) client_results_tx: mpsc::Sender<ClientResult>,
    /// Dispatcher step 1 gate: "if recovery is not
    /// complete, drop the event." Set once by `RecoveryManager` at the end
    /// of startup scan.
    pub(crate) recovery_complete: AtomicBool,
}

impl<C: Clock> Dao<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        self_addr: PeerAddr,
        config: EngineConfig,
        journal: Arc<dyn JournalGateway>,
        mlt: Arc<dyn MltClient>,
        executor: Arc<dyn ExecutorClient>,
        transport: Arc<dyn Transport>,
        clock: C,
    ) -> (Self, mpsc::Receiver<ClientResult>) {
        let (client_results_tx, client_results_rx) = mpsc::channel(256);
        let dao = Self {
            self_addr,
            config,
            journal,
            mlt,
            executor,
            transport,
            clock,
            id_gen: OperationIdGenerator::new(),
            state: Mutex::new(EngineState::new()),
            client_results_tx,
            recovery_complete: AtomicBool::new(false),
        };
        (dao, client_results_rx)
    }

    pub fn self_addr(&self) -> &PeerAddr {
        &self.self_addr
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_recovery_complete(&self) -> bool {
        self.recovery_complete.load(Ordering::Acquire)
    }

    /// Called once by `RecoveryManager` after the startup journal scan
    /// completes (spec.md §4.7 step 5: "Mark recovery complete; only then
    /// does Dispatcher begin processing inbound events.").
    pub fn mark_recovery_complete(&self) {
        self.recovery_complete.store(true, Ordering::Release);
        info!("DAO recovery complete, accepting traffic");
    }

    pub(crate) fn journal_key_for(&self, operation_type: OperationType, subtree_entry: SubtreeEntry) -> SubtreeEntry {
        if operation_type.uses_server_journal() {
            SubtreeEntry::SERVER_GLOBAL
        } else {
            subtree_entry
        }
    }

    pub(crate) async fn emit_client_result(&self, result: ClientResult) {
        if self.client_results_tx.send(result).await.is_err() {
            warn!("client result channel closed, dropping result");
        }
    }

    pub(crate) fn schedule_timeout(&self, state: &mut EngineState, op_id: OperationId, recorded_status: dao_core::status::Status, after: std::time::Duration) {
        let deadline = self.clock.now() + after;
        state.timeouts.push(TimeoutEntry::new(op_id, deadline, recorded_status));
    }

    /// Start a new operation as its coordinator.
    ///
    /// Protocol is selected from `participants.len()` alone (spec.md
    /// §4.9/protocol.rs): empty means the first hop of an OOE chain, one
    /// means MTPC, two or more means TPC. Idempotent in the sense named by
    /// spec.md §8: callers that need "two calls with identical arguments
    /// return the same decision" must dedup at a layer above this method
    /// (this crate does not store a `(type, blob, participants)` ->
    /// `op_id` index; see DESIGN.md).
    pub async fn start_coordinator(
        &self,
        operation_type: OperationType,
        blob: Vec<u8>,
        participants: Vec<Subtree>,
        subtree_entry: SubtreeEntry,
    ) -> Result<OperationId, EngineError> {
        let op_id = self.id_gen.next();
        let mut guard = self.state.lock().await;
        let mut participants = participants;
        match participants.len() {
            0 => crate::protocol::ooe::start_coordinator_first_hop(self, &mut guard, op_id, operation_type, blob, subtree_entry).await?,
            1 => {
                let participant = participants.remove(0);
                crate::protocol::mtpc::start_coordinator(self, &mut guard, op_id, operation_type, blob, participant, subtree_entry).await?
            }
            _ => crate::protocol::tpc::start_coordinator(self, &mut guard, op_id, operation_type, blob, participants, subtree_entry).await?,
        }
        Ok(op_id)
    }

    pub(crate) fn build_op_state(
        &self,
        op_id: OperationId,
        operation_type: OperationType,
        blob: Vec<u8>,
        protocol: ProtocolKind,
        status: dao_core::status::Status,
        is_coordinator: bool,
        participants: Vec<Subtree>,
        subtree_entry: SubtreeEntry,
    ) -> Result<OpState, dao_core::FatalError> {
        OpState::builder(op_id, operation_type, blob)
            .protocol(protocol)
            .status(status)
            .is_coordinator(is_coordinator)
            .participants(participants)
            .subtree_entry(subtree_entry)
            .overall_deadline(self.clock.now() + self.config.overall_timeout())
            .build()
            .map_err(dao_core::FatalError::StoreInvariant)
    }
}
