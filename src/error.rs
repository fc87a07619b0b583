//! Error types for the log and the replay engine.
//!
//! Two severities matter to callers:
//!
//! - **Fatal**: a feature gap or host misuse (replaying an unsupported
//!   opcode, opening a persisted log). Derived data must not be produced.
//!   Every [`ReplayError`] is of this kind.
//! - **Recoverable**: bounds problems in `GraphUpdate` accessors. Those are
//!   not errors at all: they log at debug level and return a default.

use graphlog_storage::StorageError;
use thiserror::Error;

use crate::oplog::{LogPosition, Opcode};

// ---------------------------------------------------------------------------
// ReplayError
// ---------------------------------------------------------------------------

/// Why a replay stopped without producing a result.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// The log holds an opcode replay cannot materialize yet.
    #[error("opcode not supported: {opcode} at {position}")]
    UnsupportedOpcode {
        /// The offending opcode.
        opcode: Opcode,
        /// Where it sits in the log.
        position: LogPosition,
    },

    /// A transaction was opened while another was still open.
    #[error("nested transaction begin at {position}")]
    NestedTransaction {
        /// The second `begin_tx`.
        position: LogPosition,
    },

    /// An abort or commit appeared with no open transaction.
    #[error("{opcode} at {position} has no matching begin_tx")]
    UnmatchedTransactionEnd {
        /// `abort_tx` or `commit_tx`.
        opcode: Opcode,
        /// Where it sits in the log.
        position: LogPosition,
    },
}

impl ReplayError {
    /// Whether the log used an opcode this build cannot replay, as opposed
    /// to a malformed transaction sequence. Both stop the replay.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOpcode { .. })
    }

    /// Log position at which replay stopped.
    #[must_use]
    pub const fn position(&self) -> LogPosition {
        match self {
            Self::UnsupportedOpcode { position, .. }
            | Self::NestedTransaction { position }
            | Self::UnmatchedTransactionEnd { position, .. } => *position,
        }
    }
}

// ---------------------------------------------------------------------------
// OpLogError
// ---------------------------------------------------------------------------

/// Errors from constructing or persisting an [`OpLog`](crate::oplog::OpLog).
#[derive(Debug, Error)]
pub enum OpLogError {
    /// Durable logs are not implemented.
    #[error("persistent log not yet implemented: {uri}")]
    PersistenceUnimplemented {
        /// The location that was requested.
        uri: String,
    },

    /// The storage layer rejected the location.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl OpLogError {
    /// Whether the host should treat this as unrecoverable.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::PersistenceUnimplemented { .. } => true,
            Self::Storage(e) => e.is_fatal(),
        }
    }
}
