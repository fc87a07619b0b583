//! Replay: fold an [`OpLog`] into a [`GraphModify`] and a [`GraphUpdate`].
//!
//! # Replay semantics
//!
//! Operations are replayed once, in log order. Log order is also the total
//! order used for conflict resolution: among writes to the same
//! (property, entity) pair, the greatest position wins.
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `NodePropSet` / `EdgePropSet` | Register the property on first sight, then record this position in the target's slot |
//! | `BeginTx` / `AbortTx` / `CommitTx` | No effect on the views; nesting is rejected |
//! | anything else | [`ReplayError::UnsupportedOpcode`] |
//!
//! Replay never returns a partial result: the first error discards both
//! views. Values are not copied; consumers dereference recorded positions
//! back into the log when they need them.
//!
//! # Example
//!
//! ```text
//! replay(graph, log)
//!   → GraphUpdate::new(graph.num_nodes(), graph.num_edges())
//!   → for (pos, op) in log: dispatch on opcode
//!   → Ok((GraphModify, GraphUpdate))
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, debug_span, error};

use crate::error::ReplayError;
use crate::graph::{BaseGraph, GraphShape};
use crate::oplog::log::{LogPosition, OpLog};
use crate::oplog::types::Operation;
use crate::view::{GraphModify, GraphUpdate, PropIndex};

// ---------------------------------------------------------------------------
// FatalPolicy
// ---------------------------------------------------------------------------

/// What a [`Replayer`] does when replay fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FatalPolicy {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Log the error and abort the process.
    Abort,
}

// ---------------------------------------------------------------------------
// Replayer
// ---------------------------------------------------------------------------

/// Replay with a host-chosen [`FatalPolicy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Replayer {
    policy: FatalPolicy,
}

impl Replayer {
    /// A replayer applying `policy` to failures.
    #[must_use]
    pub const fn new(policy: FatalPolicy) -> Self {
        Self { policy }
    }

    /// The configured policy.
    #[must_use]
    pub const fn policy(&self) -> FatalPolicy {
        self.policy
    }

    /// Replay `log` against `graph`.
    ///
    /// Under [`FatalPolicy::Abort`] this does not return on failure.
    ///
    /// # Errors
    /// Under [`FatalPolicy::Propagate`], returns the first [`ReplayError`].
    pub fn replay(
        &self,
        graph: &impl BaseGraph,
        log: &OpLog,
    ) -> Result<(GraphModify, GraphUpdate), ReplayError> {
        match replay(graph, log) {
            Err(err) if self.policy == FatalPolicy::Abort => {
                error!(error = %err, log = %log.id(), "replay failed, aborting");
                std::process::abort()
            }
            result => result,
        }
    }
}

// ---------------------------------------------------------------------------
// Replay engine
// ---------------------------------------------------------------------------

/// Per-pass state. The name tables live only as long as one replay.
struct Pass {
    update: GraphUpdate,
    modify: GraphModify,
    node_props: HashMap<String, PropIndex>,
    edge_props: HashMap<String, PropIndex>,
    open_tx: Option<LogPosition>,
}

impl Pass {
    fn new(shape: GraphShape) -> Self {
        let pass = Self {
            update: GraphUpdate::new(shape.nodes, shape.edges),
            modify: GraphModify::new(shape.nodes, shape.edges),
            node_props: HashMap::new(),
            edge_props: HashMap::new(),
            open_tx: None,
        };
        debug_assert!(pass.update.is_empty());
        debug_assert!(pass.modify.is_empty());
        pass
    }

    fn apply(&mut self, pos: LogPosition, op: &Operation) -> Result<(), ReplayError> {
        match op {
            Operation::NodePropSet { name, target, .. } => {
                let update = &mut self.update;
                let prop = intern(&mut self.node_props, name, |n| {
                    debug!(name = n, "registering node prop");
                    update.register_node_prop(n)
                });
                update.set_node_prop(prop, target.resolve(), pos);
            }

            Operation::EdgePropSet { name, target, .. } => {
                let update = &mut self.update;
                let prop = intern(&mut self.edge_props, name, |n| {
                    debug!(name = n, "registering edge prop");
                    update.register_edge_prop(n)
                });
                update.set_edge_prop(prop, target.resolve(), pos);
            }

            Operation::BeginTx => {
                if self.open_tx.is_some() {
                    error!(position = %pos, "nested transaction");
                    return Err(ReplayError::NestedTransaction { position: pos });
                }
                self.open_tx = Some(pos);
            }

            Operation::AbortTx | Operation::CommitTx { .. } => {
                if self.open_tx.take().is_none() {
                    error!(opcode = %op.opcode(), position = %pos, "transaction end without begin");
                    return Err(ReplayError::UnmatchedTransactionEnd {
                        opcode: op.opcode(),
                        position: pos,
                    });
                }
            }

            Operation::Invalid
            | Operation::NodeAdd { .. }
            | Operation::NodeAddNamed { .. }
            | Operation::NodeDel { .. }
            | Operation::EdgeAdd { .. }
            | Operation::EdgeDel { .. }
            | Operation::NodePropDel { .. }
            | Operation::EdgePropDel { .. } => {
                error!(opcode = %op.opcode(), position = %pos, "opcode not supported");
                return Err(ReplayError::UnsupportedOpcode {
                    opcode: op.opcode(),
                    position: pos,
                });
            }
        }
        Ok(())
    }
}

/// Look `name` up in this pass's table, registering it on first sight.
fn intern(
    table: &mut HashMap<String, PropIndex>,
    name: &str,
    register: impl FnOnce(&str) -> PropIndex,
) -> PropIndex {
    if let Some(&prop) = table.get(name) {
        return prop;
    }
    let prop = register(name);
    table.insert(name.to_owned(), prop);
    prop
}

/// Replay `log` against `graph`, returning the derived views.
///
/// Only the graph's node and edge counts are read. Replaying the same log
/// against the same counts always yields identical views.
///
/// # Errors
///
/// Returns the first [`ReplayError`]: an opcode this build cannot
/// materialize, or a malformed transaction sequence. No partial views are
/// returned.
pub fn replay(
    graph: &impl BaseGraph,
    log: &OpLog,
) -> Result<(GraphModify, GraphUpdate), ReplayError> {
    let shape = GraphShape::of(graph);
    let _span = debug_span!(
        "replay",
        log = %log.id(),
        ops = log.len(),
        nodes = shape.nodes,
        edges = shape.edges
    )
    .entered();

    let mut pass = Pass::new(shape);
    for (pos, op) in log.iter() {
        pass.apply(pos, op)?;
    }

    if let Some(open) = pass.open_tx {
        debug!(begin = %open, "log ends inside an open transaction");
    }
    debug!(
        nprops = pass.update.num_nprop(),
        eprops = pass.update.num_eprop(),
        "replay complete"
    );
    Ok((pass.modify, pass.update))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityAddress, PropValue};
    use crate::oplog::Opcode;
    use crate::view::UNSET_SLOT as U;

    fn shape(nodes: u64, edges: u64) -> GraphShape {
        GraphShape::new(nodes, edges)
    }

    fn node_set(name: &str, node: u64, v: i64) -> Operation {
        Operation::node_prop_set(name, EntityAddress::seq(node), v)
    }

    #[test]
    fn empty_log_yields_empty_views() {
        let (modify, update) = replay(&shape(3, 2), &OpLog::new()).unwrap();
        assert!(modify.is_empty());
        assert!(update.is_empty());
        assert_eq!((update.num_nodes(), update.num_edges()), (3, 2));
    }

    #[test]
    fn last_write_wins() {
        let mut log = OpLog::new();
        log.append(node_set("color", 0, 0));
        let second = log.append(node_set("color", 0, 1));

        let (modify, update) = replay(&shape(4, 0), &log).unwrap();
        assert!(modify.is_empty());
        assert_eq!(update.num_nprop(), 1);
        assert_eq!(update.node_prop_indices(0), &[1, U, U, U]);
        assert_eq!(update.node_prop_position(0, 0), Some(second));
        assert_eq!(update.node_prop_value(&log, 0, 0), Some(&PropValue::Int(1)));
    }

    #[test]
    fn same_name_registers_once_per_pass() {
        let mut log = OpLog::new();
        log.append(node_set("color", 0, 0));
        log.append(node_set("size", 1, 0));
        log.append(node_set("color", 1, 0));

        let (_, update) = replay(&shape(2, 0), &log).unwrap();
        assert_eq!(update.num_nprop(), 2);
        assert_eq!(update.node_prop_name(0), "color");
        assert_eq!(update.node_prop_name(1), "size");
    }

    #[test]
    fn node_and_edge_tables_are_separate() {
        let mut log = OpLog::new();
        let n = log.append(node_set("w", 1, 5));
        let e = log.append(Operation::edge_prop_set(
            "w",
            EntityAddress::existing(2),
            0.5,
        ));

        let (_, update) = replay(&shape(2, 3), &log).unwrap();
        assert_eq!((update.num_nprop(), update.num_eprop()), (1, 1));
        assert_eq!(update.node_prop_indices(0), &[U, 0]);
        assert_eq!(update.edge_prop_indices(0), &[U, U, 1]);
        assert_eq!(update.node_prop_position(0, 1), Some(n));
        assert_eq!(update.edge_prop_position(0, 2), Some(e));
    }

    #[test]
    fn out_of_range_target_is_skipped() {
        let mut log = OpLog::new();
        log.append(node_set("color", 9, 0));
        log.append(Operation::node_prop_set(
            "color",
            EntityAddress::named("alice"),
            1_i64,
        ));

        let (_, update) = replay(&shape(2, 0), &log).unwrap();
        assert_eq!(update.num_nprop(), 1);
        assert_eq!(update.node_prop_indices(0), &[U, U]);
    }

    #[test]
    fn transactions_are_walked_over() {
        let mut log = OpLog::new();
        log.append(Operation::BeginTx);
        let a = log.append(node_set("p", 0, 1));
        log.append(Operation::CommitTx {
            snapshot: Some("rdg-2".to_owned()),
        });
        log.append(Operation::BeginTx);
        let b = log.append(node_set("p", 1, 2));
        log.append(Operation::AbortTx);

        let (modify, update) = replay(&shape(2, 0), &log).unwrap();
        assert!(modify.is_empty());
        assert_eq!(update.node_prop_indices(0), &[a.index(), b.index()]);
    }

    #[test]
    fn nested_begin_is_rejected() {
        let mut log = OpLog::new();
        log.append(Operation::BeginTx);
        let second = log.append(Operation::BeginTx);
        let err = replay(&shape(1, 0), &log).unwrap_err();
        assert_eq!(err, ReplayError::NestedTransaction { position: second });
        assert!(!err.is_unsupported());
    }

    #[test]
    fn unmatched_end_is_rejected() {
        let mut log = OpLog::new();
        let commit = log.append(Operation::CommitTx { snapshot: None });
        assert_eq!(
            replay(&shape(1, 0), &log).unwrap_err(),
            ReplayError::UnmatchedTransactionEnd {
                opcode: Opcode::CommitTx,
                position: commit,
            }
        );
    }

    #[test]
    fn trailing_open_transaction_is_accepted() {
        let mut log = OpLog::new();
        log.append(Operation::BeginTx);
        log.append(node_set("p", 0, 1));
        assert!(replay(&shape(1, 0), &log).is_ok());
    }

    #[test]
    fn unsupported_opcode_stops_replay() {
        let unsupported = [
            Operation::Invalid,
            Operation::NodeAdd { count: 2 },
            Operation::NodeAddNamed {
                name: "n".to_owned(),
            },
            Operation::NodeDel {
                node: EntityAddress::existing(0),
            },
            Operation::EdgeAdd {
                src: EntityAddress::seq(0),
                dst: EntityAddress::existing(1),
            },
            Operation::EdgeDel {
                src: EntityAddress::existing(0),
                dst: EntityAddress::existing(1),
            },
            Operation::NodePropDel {
                name: "p".to_owned(),
            },
            Operation::EdgePropDel {
                name: "p".to_owned(),
            },
        ];
        for op in unsupported {
            let mut log = OpLog::new();
            log.append(node_set("p", 0, 1));
            let bad = log.append(op.clone());
            log.append(node_set("p", 0, 2));

            let err = replay(&shape(1, 1), &log).unwrap_err();
            assert_eq!(
                err,
                ReplayError::UnsupportedOpcode {
                    opcode: op.opcode(),
                    position: bad,
                },
                "{op}"
            );
        }
    }

    #[test]
    fn replayer_propagates_by_default() {
        let mut log = OpLog::new();
        log.append(Operation::NodeAdd { count: 1 });
        let replayer = Replayer::default();
        assert_eq!(replayer.policy(), FatalPolicy::Propagate);
        assert!(replayer.replay(&shape(1, 0), &log).is_err());
    }
}
