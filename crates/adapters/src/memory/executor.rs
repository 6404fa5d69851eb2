// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dao_core::operation_id::OperationId;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{PeerAddr, SubtreeEntry};
use tokio::sync::Mutex;

use crate::executor::{ExecutorClient, ExecutorOutcome};

/// Scripted per-operation behavior for [`InMemoryExecutor`].
#[derive(Debug, Clone, Default)]
pub struct ExecutorScript {
    pub do_outcome: Option<ExecutorOutcome>,
    pub undo_outcome: Option<ExecutorOutcome>,
    pub sending_addresses: Vec<PeerAddr>,
    pub subtree_entry_point: Option<SubtreeEntry>,
    pub is_coordinator: bool,
}

/// An [`ExecutorClient`] that returns pre-scripted outcomes instead of
/// touching a real filesystem, for tests and `dao-harness`. Defaults to
/// `ExecutionSuccessful`/`UndoSuccessful` with no next hop when an
/// operation has no script registered.
#[derive(Clone, Default)]
pub struct InMemoryExecutor {
    scripts: Arc<Mutex<HashMap<OperationId, ExecutorScript>>>,
    /// Fallback used when no per-op_id script is registered. Lets a test
    /// arrange a node's behavior (e.g. "this participant always fails
    /// local execution") before the operation id generated by a remote
    /// coordinator is known, rather than racing a `script()` call against
    /// the request worker that will consume the inbound op-request.
    default: Arc<Mutex<Option<ExecutorScript>>>,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn script(&self, op_id: OperationId, script: ExecutorScript) {
        self.scripts.lock().await.insert(op_id, script);
    }

    pub async fn set_default(&self, script: ExecutorScript) {
        *self.default.lock().await = Some(script);
    }

    async fn script_for(&self, op_id: OperationId) -> ExecutorScript {
        if let Some(script) = self.scripts.lock().await.get(&op_id).cloned() {
            return script;
        }
        self.default.lock().await.clone().unwrap_or_default()
    }
}

#[async_trait]
impl ExecutorClient for InMemoryExecutor {
    async fn do_request(&self, op_id: OperationId, _operation_type: OperationType, _blob: &[u8]) -> ExecutorOutcome {
        self.script_for(op_id)
            .await
            .do_outcome
            .unwrap_or(ExecutorOutcome::ExecutionSuccessful { next_participant: None })
    }

    async fn redo_request(&self, op_id: OperationId, _operation_type: OperationType, _blob: &[u8]) -> ExecutorOutcome {
        self.script_for(op_id)
            .await
            .do_outcome
            .unwrap_or(ExecutorOutcome::ExecutionSuccessful { next_participant: None })
    }

    async fn undo_request(&self, op_id: OperationId, _operation_type: OperationType, _blob: &[u8]) -> ExecutorOutcome {
        self.script_for(op_id).await.undo_outcome.unwrap_or(ExecutorOutcome::UndoSuccessful)
    }

    async fn reundo_request(&self, op_id: OperationId, _operation_type: OperationType, _blob: &[u8]) -> ExecutorOutcome {
        self.script_for(op_id).await.undo_outcome.unwrap_or(ExecutorOutcome::UndoSuccessful)
    }

    async fn set_sending_addresses(&self, op_id: OperationId) -> Vec<PeerAddr> {
        self.script_for(op_id).await.sending_addresses
    }

    async fn set_subtree_entry_point(&self, op_id: OperationId) -> Option<SubtreeEntry> {
        self.script_for(op_id).await.subtree_entry_point
    }

    async fn is_coordinator(&self, op_id: OperationId) -> bool {
        self.script_for(op_id).await.is_coordinator
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
