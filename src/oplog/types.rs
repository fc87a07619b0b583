//! The [`Operation`] record and its [`Opcode`] taxonomy.
//!
//! An operation is a single typed mutation appended to an [`OpLog`]. Each
//! variant carries exactly the operands its opcode needs; the finer opcode
//! (e.g. which of the four edge-addressing forms) is derived from the
//! operands by [`Operation::opcode`].
//!
//! Serialized with an `"op"` tag: `{"op":"node_prop_set","name":…}` etc.
//!
//! [`OpLog`]: crate::oplog::OpLog

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{EntityAddress, PropValue};

// ---------------------------------------------------------------------------
// Opcode
// ---------------------------------------------------------------------------

/// Discriminator of an operation's mutation kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    /// Placeholder returned for out-of-range reads.
    Invalid,
    /// Add `count` anonymous nodes.
    NodeAdd,
    /// Add one node with a caller-chosen name.
    NodeAddNamed,
    /// Delete a node created in this log.
    NodeDel,
    /// Delete a node of the base graph.
    NodeDelExisting,
    /// Add an edge between two new nodes.
    EdgeAdd,
    /// Add an edge from a new node to an existing node.
    EdgeAddFrom,
    /// Add an edge from an existing node to a new node.
    EdgeAddTo,
    /// Add an edge between two existing nodes.
    EdgeAddExisting,
    /// Delete an edge between two new nodes.
    EdgeDel,
    /// Delete an edge from a new node to an existing node.
    EdgeDelFrom,
    /// Delete an edge from an existing node to a new node.
    EdgeDelTo,
    /// Delete an edge between two existing nodes.
    EdgeDelExisting,
    /// Drop a node property entirely.
    NodePropDel,
    /// Drop an edge property entirely.
    EdgePropDel,
    /// Set a node property on a new node.
    NodePropVal,
    /// Set a node property on an existing node.
    NodePropValExisting,
    /// Set an edge property on a new edge.
    EdgePropVal,
    /// Set an edge property on an existing edge.
    EdgePropValExisting,
    /// Open a transaction.
    BeginTx,
    /// Roll back the open transaction.
    AbortTx,
    /// Commit the open transaction.
    CommitTx,
}

impl Opcode {
    /// Whether the opcode changes topology (entity or edge add/delete).
    #[must_use]
    pub const fn is_topology_change(self) -> bool {
        matches!(
            self,
            Self::NodeAdd
                | Self::NodeAddNamed
                | Self::NodeDel
                | Self::NodeDelExisting
                | Self::EdgeAdd
                | Self::EdgeAddFrom
                | Self::EdgeAddTo
                | Self::EdgeAddExisting
                | Self::EdgeDel
                | Self::EdgeDelFrom
                | Self::EdgeDelTo
                | Self::EdgeDelExisting
        )
    }

    /// Whether the opcode sets a property value.
    #[must_use]
    pub const fn is_property_set(self) -> bool {
        matches!(
            self,
            Self::NodePropVal
                | Self::NodePropValExisting
                | Self::EdgePropVal
                | Self::EdgePropValExisting
        )
    }

    /// Whether the opcode is a transaction boundary.
    #[must_use]
    pub const fn is_transaction_marker(self) -> bool {
        matches!(self, Self::BeginTx | Self::AbortTx | Self::CommitTx)
    }

    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::NodeAdd => "node_add",
            Self::NodeAddNamed => "node_add_named",
            Self::NodeDel => "node_del",
            Self::NodeDelExisting => "node_del_existing",
            Self::EdgeAdd => "edge_add",
            Self::EdgeAddFrom => "edge_add_from",
            Self::EdgeAddTo => "edge_add_to",
            Self::EdgeAddExisting => "edge_add_existing",
            Self::EdgeDel => "edge_del",
            Self::EdgeDelFrom => "edge_del_from",
            Self::EdgeDelTo => "edge_del_to",
            Self::EdgeDelExisting => "edge_del_existing",
            Self::NodePropDel => "node_prop_del",
            Self::EdgePropDel => "edge_prop_del",
            Self::NodePropVal => "node_prop_val",
            Self::NodePropValExisting => "node_prop_val_existing",
            Self::EdgePropVal => "edge_prop_val",
            Self::EdgePropValExisting => "edge_prop_val_existing",
            Self::BeginTx => "begin_tx",
            Self::AbortTx => "abort_tx",
            Self::CommitTx => "commit_tx",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// A single mutation record in the log.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// No mutation. Only produced by out-of-range log reads.
    #[default]
    Invalid,

    /// Add `count` nodes, numbered after every node this log created so far.
    NodeAdd {
        /// How many nodes to create.
        count: u64,
    },

    /// Add one node under a caller-chosen name.
    NodeAddNamed {
        /// The new node's name.
        name: String,
    },

    /// Delete a node.
    NodeDel {
        /// The node to delete.
        node: EntityAddress,
    },

    /// Add an edge.
    EdgeAdd {
        /// Source endpoint.
        src: EntityAddress,
        /// Destination endpoint.
        dst: EntityAddress,
    },

    /// Delete an edge.
    EdgeDel {
        /// Source endpoint.
        src: EntityAddress,
        /// Destination endpoint.
        dst: EntityAddress,
    },

    /// Drop a node property from every node.
    NodePropDel {
        /// Property name.
        name: String,
    },

    /// Drop an edge property from every edge.
    EdgePropDel {
        /// Property name.
        name: String,
    },

    /// Set one node's property value.
    NodePropSet {
        /// Property name.
        name: String,
        /// The node written.
        target: EntityAddress,
        /// The value written.
        value: PropValue,
    },

    /// Set one edge's property value.
    EdgePropSet {
        /// Property name.
        name: String,
        /// The edge written.
        target: EntityAddress,
        /// The value written.
        value: PropValue,
    },

    /// Open a transaction. Transactions never nest.
    BeginTx,

    /// Roll back the open transaction.
    AbortTx,

    /// Commit the open transaction, optionally tagging the resulting snapshot.
    CommitTx {
        /// Name of the graph snapshot produced by the commit.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snapshot: Option<String>,
    },
}

impl Operation {
    /// Set a node property.
    #[must_use]
    pub fn node_prop_set(
        name: impl Into<String>,
        target: EntityAddress,
        value: impl Into<PropValue>,
    ) -> Self {
        Self::NodePropSet {
            name: name.into(),
            target,
            value: value.into(),
        }
    }

    /// Set an edge property.
    #[must_use]
    pub fn edge_prop_set(
        name: impl Into<String>,
        target: EntityAddress,
        value: impl Into<PropValue>,
    ) -> Self {
        Self::EdgePropSet {
            name: name.into(),
            target,
            value: value.into(),
        }
    }

    /// The opcode this record represents.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Invalid => Opcode::Invalid,
            Self::NodeAdd { .. } => Opcode::NodeAdd,
            Self::NodeAddNamed { .. } => Opcode::NodeAddNamed,
            Self::NodeDel { node } => {
                if node.is_new() {
                    Opcode::NodeDel
                } else {
                    Opcode::NodeDelExisting
                }
            }
            Self::EdgeAdd { src, dst } => match (src.is_new(), dst.is_new()) {
                (true, true) => Opcode::EdgeAdd,
                (true, false) => Opcode::EdgeAddFrom,
                (false, true) => Opcode::EdgeAddTo,
                (false, false) => Opcode::EdgeAddExisting,
            },
            Self::EdgeDel { src, dst } => match (src.is_new(), dst.is_new()) {
                (true, true) => Opcode::EdgeDel,
                (true, false) => Opcode::EdgeDelFrom,
                (false, true) => Opcode::EdgeDelTo,
                (false, false) => Opcode::EdgeDelExisting,
            },
            Self::NodePropDel { .. } => Opcode::NodePropDel,
            Self::EdgePropDel { .. } => Opcode::EdgePropDel,
            Self::NodePropSet { target, .. } => {
                if target.is_new() {
                    Opcode::NodePropVal
                } else {
                    Opcode::NodePropValExisting
                }
            }
            Self::EdgePropSet { target, .. } => {
                if target.is_new() {
                    Opcode::EdgePropVal
                } else {
                    Opcode::EdgePropValExisting
                }
            }
            Self::BeginTx => Opcode::BeginTx,
            Self::AbortTx => Opcode::AbortTx,
            Self::CommitTx { .. } => Opcode::CommitTx,
        }
    }

    /// The value carried by a property-set operation.
    #[must_use]
    pub const fn value(&self) -> Option<&PropValue> {
        match self {
            Self::NodePropSet { value, .. } | Self::EdgePropSet { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid | Self::BeginTx | Self::AbortTx => write!(f, "{}", self.opcode()),
            Self::NodeAdd { count } => write!(f, "node_add({count})"),
            Self::NodeAddNamed { name } => write!(f, "node_add_named({name})"),
            Self::NodeDel { node } => write!(f, "{}({node})", self.opcode()),
            Self::EdgeAdd { src, dst } | Self::EdgeDel { src, dst } => {
                write!(f, "{}({src} -> {dst})", self.opcode())
            }
            Self::NodePropDel { name } | Self::EdgePropDel { name } => {
                write!(f, "{}({name})", self.opcode())
            }
            Self::NodePropSet {
                name,
                target,
                value,
            }
            | Self::EdgePropSet {
                name,
                target,
                value,
            } => write!(f, "{}({name}, {target} = {value})", self.opcode()),
            Self::CommitTx { snapshot: None } => f.write_str("commit_tx"),
            Self::CommitTx {
                snapshot: Some(tag),
            } => write!(f, "commit_tx({tag})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
