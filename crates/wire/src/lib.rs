// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dao-wire: the peer wire protocol for the distributed atomic operations
//! coordinator.
//!
//! Every message between MDS peers is an [`Event`], framed as
//! `event_tag:u8 ∥ op_id:u64 (LE) ∥ body`. [`codec::encode`]
//! and [`codec::decode`] are the only place that framing is known; every
//! other crate works with typed `Event` values. [`Tag`] resolves the §9
//! Open Question by giving `TPCOpReq`/`MTPCOpReq`/`OOEOpReq` distinct tag
//! bytes rather than overloading one.

pub mod codec;
pub mod error;
pub mod event;
pub mod tag;

pub use codec::{decode, encode};
pub use error::ProtocolError;
pub use event::Event;
pub use tag::Tag;