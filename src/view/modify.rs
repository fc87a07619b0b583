//! Topology changes derived from a log, for peer-to-peer application.
//!
//! A [`GraphModify`] is built by the same replay pass as
//! [`GraphUpdate`](crate::view::GraphUpdate) and follows the same ownership
//! rules: it records log positions only, and is valid while its source log
//! is neither cleared nor replaced.
//!
//! Replay does not yet materialize any topology-changing opcode (those are
//! rejected), so every `GraphModify` it returns is empty. [`is_empty`]
//! turns false exactly when a topology change has been recorded.
//!
//! [`is_empty`]: GraphModify::is_empty

use crate::oplog::LogPosition;

/// Positions of materialized entity and edge additions and deletions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphModify {
    changes: Vec<LogPosition>,
    num_nodes: u64,
    num_edges: u64,
}

impl GraphModify {
    /// An empty descriptor over a base graph with the given entity counts.
    #[must_use]
    pub const fn new(num_nodes: u64, num_edges: u64) -> Self {
        Self {
            changes: Vec::new(),
            num_nodes,
            num_edges,
        }
    }

    /// Node count of the base graph this was built against.
    #[must_use]
    pub const fn num_nodes(&self) -> u64 {
        self.num_nodes
    }

    /// Edge count of the base graph this was built against.
    #[must_use]
    pub const fn num_edges(&self) -> u64 {
        self.num_edges
    }

    /// Positions of the materialized topology changes, in log order.
    #[must_use]
    pub fn changes(&self) -> &[LogPosition] {
        &self.changes
    }

    /// True while no topology change has been materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
