// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failure decoding a wire frame. Per spec.md §4.3, a decode failure is
/// never fatal to the connection: the Dispatcher logs and drops the frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("frame shorter than the 9-byte tag+op_id header")]
    Truncated,

    #[error("unknown event tag {0}")]
    UnknownTag(u8),

    #[error("unknown operation type byte {0}")]
    UnknownOperationType(u8),

    #[error("unknown status byte {0}")]
    UnknownStatus(u8),

    #[error("declared blob length does not match remaining frame bytes")]
    LengthMismatch,

    #[error("frame has {0} trailing bytes after its declared body")]
    TrailingBytes(usize),
}
