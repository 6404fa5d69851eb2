// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three protocol engines plus the outbound-message
//! plumbing they share (spec.md §4.5 "Outbound message rules common to
//! all protocols").

pub(crate) mod common;
pub(crate) mod mtpc;
pub(crate) mod ooe;
pub(crate) mod tpc;

use dao_core::clock::Clock;
use dao_core::operation_id::OperationId;
use dao_core::protocol::ProtocolKind;
use dao_core::status::Status;
use dao_core::subtree::PeerAddr;
use dao_wire::Event;

use crate::dao::{Dao, EngineState};
use crate::error::EngineError;

/// Route an inbound event to the protocol engine of the operation it
/// belongs to. Called by
/// the dispatcher once sender authorization and event-validity have
/// already been checked.
pub(crate) async fn route_event<C: Clock>(dao: &Dao<C>, state: &mut EngineState, sender: PeerAddr, protocol: ProtocolKind, event: Event) -> Result<(), EngineError> {
    match protocol {
        ProtocolKind::Tpc => tpc::handle_event(dao, state, sender, event).await,
        ProtocolKind::Mtpc => mtpc::handle_event(dao, state, sender, event).await,
        ProtocolKind::Ooe => ooe::handle_event(dao, state, sender, event).await,
    }
}

/// Route a fired timeout entry to the protocol engine that owns its
/// status.
pub(crate) async fn route_timeout<C: Clock>(dao: &Dao<C>, state: &mut EngineState, op_id: OperationId, protocol: ProtocolKind, status: Status) -> Result<(), EngineError> {
    match protocol {
        ProtocolKind::Tpc => tpc::handle_timeout(dao, state, op_id, status).await,
        ProtocolKind::Mtpc => mtpc::handle_timeout(dao, state, op_id, status).await,
        ProtocolKind::Ooe => ooe::handle_timeout(dao, state, op_id, status).await,
    }
}
