//! Property-value changes derived from a log, for repartitioning.
//!
//! A [`GraphUpdate`] holds, per registered node or edge property, one slot
//! per base-graph entity. A slot is either [`UNSET_SLOT`] (never written) or
//! the log index of the operation that last wrote that entity's value.
//! Slots are plain `u64`s; the log identity and generation they belong to
//! are stamped once per update, from the first position recorded, and
//! positions from any other log generation are refused.
//! [`GraphUpdate::node_prop_position`] rebuilds a full [`LogPosition`], and
//! [`GraphUpdate::node_prop_value`] dereferences it on demand.
//!
//! The structure is only meaningful while its source log is neither cleared
//! nor replaced: slots hold positions, never copies.
//!
//! Accessors are lenient. An out-of-range property or entity index is logged
//! at debug level and answered with a harmless default (no-op, empty name,
//! empty slice), since callers routinely hold indices from an older replay.

use tracing::debug;

use crate::model::PropValue;
use crate::oplog::{LogPosition, OpLog};

/// Index of a registered property within its node or edge table.
pub type PropIndex = u32;

/// Slot value of an entity whose property has not been written.
pub const UNSET_SLOT: u64 = u64::MAX;

#[derive(Clone, Debug, PartialEq, Eq)]
struct PropColumn {
    name: String,
    slots: Vec<u64>,
}

/// Per-property, per-entity record of the authoritative log position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphUpdate {
    nprops: Vec<PropColumn>,
    eprops: Vec<PropColumn>,
    num_nodes: u64,
    num_edges: u64,
    source: Option<LogPosition>,
}

impl GraphUpdate {
    /// An update sized for a base graph with the given entity counts.
    #[must_use]
    pub const fn new(num_nodes: u64, num_edges: u64) -> Self {
        Self {
            nprops: Vec::new(),
            eprops: Vec::new(),
            num_nodes,
            num_edges,
            source: None,
        }
    }

    /// Node count every node property is sized to.
    #[must_use]
    pub const fn num_nodes(&self) -> u64 {
        self.num_nodes
    }

    /// Edge count every edge property is sized to.
    #[must_use]
    pub const fn num_edges(&self) -> u64 {
        self.num_edges
    }

    /// Number of registered node properties.
    #[must_use]
    pub fn num_nprop(&self) -> u32 {
        table_len(&self.nprops)
    }

    /// Number of registered edge properties.
    #[must_use]
    pub fn num_eprop(&self) -> u32 {
        table_len(&self.eprops)
    }

    /// True until the first property of either kind is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nprops.is_empty() && self.eprops.is_empty()
    }

    /// Add a node property with every slot unset and return its index.
    ///
    /// Names are not deduplicated: registering the same name twice yields
    /// two independent properties.
    pub fn register_node_prop(&mut self, name: impl Into<String>) -> PropIndex {
        register(&mut self.nprops, name.into(), self.num_nodes)
    }

    /// Add an edge property with every slot unset and return its index.
    ///
    /// Names are not deduplicated.
    pub fn register_edge_prop(&mut self, name: impl Into<String>) -> PropIndex {
        register(&mut self.eprops, name.into(), self.num_edges)
    }

    /// Record that `pos` holds node `node`'s value for property `prop`.
    pub fn set_node_prop(&mut self, prop: PropIndex, node: u64, pos: LogPosition) {
        if self.accepts(pos)
            && set_slot(&mut self.nprops, "node", prop, node, pos)
            && self.source.is_none()
        {
            self.source = Some(pos);
        }
    }

    /// Record that `pos` holds edge `edge`'s value for property `prop`.
    pub fn set_edge_prop(&mut self, prop: PropIndex, edge: u64, pos: LogPosition) {
        if self.accepts(pos)
            && set_slot(&mut self.eprops, "edge", prop, edge, pos)
            && self.source.is_none()
        {
            self.source = Some(pos);
        }
    }

    /// Name of node property `prop`, or `""` if out of range.
    #[must_use]
    pub fn node_prop_name(&self, prop: PropIndex) -> &str {
        column(&self.nprops, "node", prop).map_or("", |c| c.name.as_str())
    }

    /// Name of edge property `prop`, or `""` if out of range.
    #[must_use]
    pub fn edge_prop_name(&self, prop: PropIndex) -> &str {
        column(&self.eprops, "edge", prop).map_or("", |c| c.name.as_str())
    }

    /// Log indices of node property `prop`, one per node, with
    /// [`UNSET_SLOT`] for unwritten nodes. Empty if `prop` is out of range.
    #[must_use]
    pub fn node_prop_indices(&self, prop: PropIndex) -> &[u64] {
        column(&self.nprops, "node", prop)
            .map(|c| c.slots.as_slice())
            .unwrap_or_default()
    }

    /// Log indices of edge property `prop`; see
    /// [`node_prop_indices`](Self::node_prop_indices).
    #[must_use]
    pub fn edge_prop_indices(&self, prop: PropIndex) -> &[u64] {
        column(&self.eprops, "edge", prop)
            .map(|c| c.slots.as_slice())
            .unwrap_or_default()
    }

    /// The position that last wrote node `node`'s property `prop`.
    #[must_use]
    pub fn node_prop_position(&self, prop: PropIndex, node: u64) -> Option<LogPosition> {
        self.position(self.node_prop_indices(prop), node)
    }

    /// The position that last wrote edge `edge`'s property `prop`.
    #[must_use]
    pub fn edge_prop_position(&self, prop: PropIndex, edge: u64) -> Option<LogPosition> {
        self.position(self.edge_prop_indices(prop), edge)
    }

    /// Index of the first node property registered under `name`.
    #[must_use]
    pub fn node_prop_index(&self, name: &str) -> Option<PropIndex> {
        find(&self.nprops, name)
    }

    /// Index of the first edge property registered under `name`.
    #[must_use]
    pub fn edge_prop_index(&self, name: &str) -> Option<PropIndex> {
        find(&self.eprops, name)
    }

    /// The value node `node` holds for property `prop`, read back from `log`.
    ///
    /// `None` if the slot is unset, the indices are out of range, `log` is
    /// not the log this update was replayed from (or has been cleared since),
    /// or the recorded operation carries no value.
    #[must_use]
    pub fn node_prop_value<'a>(
        &self,
        log: &'a OpLog,
        prop: PropIndex,
        node: u64,
    ) -> Option<&'a PropValue> {
        log.try_get(self.node_prop_position(prop, node)?)?.value()
    }

    /// The value edge `edge` holds for property `prop`, read back from `log`.
    ///
    /// See [`node_prop_value`](Self::node_prop_value).
    #[must_use]
    pub fn edge_prop_value<'a>(
        &self,
        log: &'a OpLog,
        prop: PropIndex,
        edge: u64,
    ) -> Option<&'a PropValue> {
        log.try_get(self.edge_prop_position(prop, edge)?)?.value()
    }

    fn accepts(&self, pos: LogPosition) -> bool {
        match self.source {
            Some(source) if !source.same_origin(pos) => {
                debug!(position = %pos, source = %source, "position from another log ignored");
                false
            }
            _ => true,
        }
    }

    fn position(&self, slots: &[u64], entity: u64) -> Option<LogPosition> {
        let index = *slots.get(usize::try_from(entity).ok()?)?;
        if index == UNSET_SLOT {
            return None;
        }
        self.source.map(|source| source.with_index(index))
    }
}

fn table_len(table: &[PropColumn]) -> u32 {
    u32::try_from(table.len()).unwrap_or(u32::MAX)
}

fn register(table: &mut Vec<PropColumn>, name: String, entities: u64) -> PropIndex {
    let index = table_len(table);
    let slots = usize::try_from(entities).unwrap_or(usize::MAX);
    table.push(PropColumn {
        name,
        slots: vec![UNSET_SLOT; slots],
    });
    index
}

fn column<'a>(table: &'a [PropColumn], kind: &str, prop: PropIndex) -> Option<&'a PropColumn> {
    let found = usize::try_from(prop).ok().and_then(|i| table.get(i));
    if found.is_none() {
        debug!(kind, prop, len = table.len(), "property number out of bounds");
    }
    found
}

/// Write `pos` into the slot, returning whether it was in range.
fn set_slot(table: &mut [PropColumn], kind: &str, prop: PropIndex, entity: u64, pos: LogPosition) -> bool {
    let len = table.len();
    let Some(column) = usize::try_from(prop).ok().and_then(|i| table.get_mut(i)) else {
        debug!(kind, prop, len, "property number out of bounds");
        return false;
    };
    let slots = column.slots.len();
    let Some(slot) = usize::try_from(entity)
        .ok()
        .and_then(|i| column.slots.get_mut(i))
    else {
        debug!(kind, prop, entity, slots, "entity index out of bounds");
        return false;
    };
    debug_assert_ne!(pos.index(), UNSET_SLOT);
    *slot = pos.index();
    true
}

fn find(table: &[PropColumn], name: &str) -> Option<PropIndex> {
    table
        .iter()
        .position(|c| c.name == name)
        .and_then(|i| u32::try_from(i).ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityAddress;
    use crate::oplog::Operation;

    const U: u64 = UNSET_SLOT;

    fn positions(n: usize) -> (OpLog, Vec<LogPosition>) {
        let mut log = OpLog::new();
        let pos = (0..n)
            .map(|i| {
                log.append(Operation::node_prop_set(
                    "p",
                    EntityAddress::seq(0),
                    i as i64,
                ))
            })
            .collect();
        (log, pos)
    }

    #[test]
    fn empty_until_first_registration() {
        let mut update = GraphUpdate::new(4, 2);
        assert!(update.is_empty());
        assert_eq!(update.num_nprop(), 0);
        update.register_edge_prop("weight");
        assert!(!update.is_empty());
        assert_eq!(update.num_eprop(), 1);
    }

    #[test]
    fn registration_sizes_slots_to_entity_counts() {
        let mut update = GraphUpdate::new(4, 2);
        let n = update.register_node_prop("color");
        let e = update.register_edge_prop("weight");
        assert_eq!(update.node_prop_indices(n), &[U; 4]);
        assert_eq!(update.edge_prop_indices(e), &[U; 2]);
        assert_eq!(update.node_prop_name(n), "color");
        assert_eq!(update.edge_prop_name(e), "weight");
    }

    #[test]
    fn slots_are_one_word_per_entity() {
        let mut update = GraphUpdate::new(1000, 0);
        let p = update.register_node_prop("p");
        assert_eq!(std::mem::size_of_val(update.node_prop_indices(p)), 8 * 1000);
    }

    #[test]
    fn direct_registration_does_not_dedup() {
        let mut update = GraphUpdate::new(1, 0);
        let a = update.register_node_prop("color");
        let b = update.register_node_prop("color");
        assert_eq!((a, b), (0, 1));
        assert_eq!(update.num_nprop(), 2);
        assert_eq!(update.node_prop_index("color"), Some(0));
    }

    #[test]
    fn set_overwrites_slot() {
        let (_log, pos) = positions(2);
        let mut update = GraphUpdate::new(3, 0);
        let p = update.register_node_prop("p");
        update.set_node_prop(p, 1, pos[0]);
        update.set_node_prop(p, 1, pos[1]);
        assert_eq!(update.node_prop_indices(p), &[U, 1, U]);
        assert_eq!(update.node_prop_position(p, 1), Some(pos[1]));
        assert_eq!(update.node_prop_position(p, 0), None);
    }

    #[test]
    fn out_of_range_set_is_a_no_op() {
        let (_log, pos) = positions(1);
        let mut update = GraphUpdate::new(2, 1);
        let p = update.register_node_prop("p");
        let before = update.clone();
        update.set_node_prop(p, 2, pos[0]);
        update.set_node_prop(p + 1, 0, pos[0]);
        update.set_edge_prop(0, 0, pos[0]);
        assert_eq!(update, before);
    }

    #[test]
    fn positions_from_another_log_are_refused() {
        let (_a, pa) = positions(1);
        let (_b, pb) = positions(2);
        let mut update = GraphUpdate::new(2, 0);
        let p = update.register_node_prop("p");
        update.set_node_prop(p, 0, pa[0]);
        update.set_node_prop(p, 1, pb[1]);
        assert_eq!(update.node_prop_indices(p), &[0, U]);
        assert_eq!(update.node_prop_position(p, 0), Some(pa[0]));
    }

    #[test]
    fn out_of_range_reads_return_defaults() {
        let update = GraphUpdate::new(2, 2);
        assert_eq!(update.node_prop_name(0), "");
        assert_eq!(update.edge_prop_name(7), "");
        assert!(update.node_prop_indices(0).is_empty());
        assert!(update.edge_prop_indices(3).is_empty());
        assert_eq!(update.edge_prop_position(3, 0), None);
        assert_eq!(update.edge_prop_index("nope"), None);
    }

    #[test]
    fn value_dereferences_into_log() {
        let (log, pos) = positions(3);
        let mut update = GraphUpdate::new(2, 0);
        let p = update.register_node_prop("p");
        update.set_node_prop(p, 0, pos[2]);
        assert_eq!(update.node_prop_value(&log, p, 0), Some(&PropValue::Int(2)));
        assert_eq!(update.node_prop_value(&log, p, 1), None);
        assert_eq!(update.node_prop_value(&log, p, 9), None);
    }

    #[test]
    fn value_is_none_against_cleared_or_foreign_log() {
        let (mut log, pos) = positions(1);
        let mut update = GraphUpdate::new(1, 0);
        let p = update.register_node_prop("p");
        update.set_node_prop(p, 0, pos[0]);

        let (other, _) = positions(1);
        assert_eq!(update.node_prop_value(&other, p, 0), None);

        log.clear();
        log.append(Operation::node_prop_set("p", EntityAddress::seq(0), 99_i64));
        assert_eq!(update.node_prop_value(&log, p, 0), None);
    }
}
