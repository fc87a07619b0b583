//! The read-only base graph, as far as replay needs to see it.

use serde::{Deserialize, Serialize};

/// Entity counts of the immutable graph a log is replayed against.
///
/// Replay only sizes its output from these; no other graph state is read.
pub trait BaseGraph {
    /// Number of nodes in this partition.
    fn num_nodes(&self) -> u64;

    /// Number of edges in this partition.
    fn num_edges(&self) -> u64;
}

/// A plain snapshot of a graph's entity counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphShape {
    /// Node count.
    pub nodes: u64,
    /// Edge count.
    pub edges: u64,
}

impl GraphShape {
    /// A shape with the given counts.
    #[must_use]
    pub const fn new(nodes: u64, edges: u64) -> Self {
        Self { nodes, edges }
    }

    /// Capture the counts of any [`BaseGraph`].
    #[must_use]
    pub fn of(graph: &impl BaseGraph) -> Self {
        Self::new(graph.num_nodes(), graph.num_edges())
    }
}

impl BaseGraph for GraphShape {
    fn num_nodes(&self) -> u64 {
        self.nodes
    }

    fn num_edges(&self) -> u64 {
        self.edges
    }
}

impl<G: BaseGraph + ?Sized> BaseGraph for &G {
    fn num_nodes(&self) -> u64 {
        (**self).num_nodes()
    }

    fn num_edges(&self) -> u64 {
        (**self).num_edges()
    }
}
