//! `graphlog replay`: replay an operations fixture and summarize the result.
//!
//! The fixture is a JSON array of operations in their tagged form, e.g.
//! `[{"op":"node_prop_set","name":"color","target":{"existing":0},"value":{"type":"int","value":3}}]`.
//! It exists for debugging; it is not a durable log format.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use graphlog::config::GraphlogConfig;
use graphlog::graph::GraphShape;
use graphlog::oplog::{OpLog, Operation};
use graphlog::view::{GraphModify, GraphUpdate, UNSET_SLOT};

/// Arguments for `graphlog replay`.
#[derive(Args)]
pub struct ReplayArgs {
    /// JSON file holding an array of operations.
    #[arg(long)]
    ops: PathBuf,

    /// Node count of the base graph.
    #[arg(long, default_value_t = 0)]
    nodes: u64,

    /// Edge count of the base graph.
    #[arg(long, default_value_t = 0)]
    edges: u64,
}

#[derive(Serialize)]
struct Summary {
    ops: usize,
    nodes: u64,
    edges: u64,
    modify_empty: bool,
    node_props: Vec<PropSummary>,
    edge_props: Vec<PropSummary>,
}

#[derive(Serialize)]
struct PropSummary {
    name: String,
    written: usize,
}

impl Summary {
    fn new(log: &OpLog, modify: &GraphModify, update: &GraphUpdate) -> Self {
        let node_props = (0..update.num_nprop())
            .map(|p| PropSummary::of(update.node_prop_name(p), update.node_prop_indices(p)))
            .collect();
        let edge_props = (0..update.num_eprop())
            .map(|p| PropSummary::of(update.edge_prop_name(p), update.edge_prop_indices(p)))
            .collect();
        Self {
            ops: log.len(),
            nodes: update.num_nodes(),
            edges: update.num_edges(),
            modify_empty: modify.is_empty(),
            node_props,
            edge_props,
        }
    }
}

impl PropSummary {
    fn of(name: &str, slots: &[u64]) -> Self {
        Self {
            name: name.to_owned(),
            written: slots.iter().filter(|&&s| s != UNSET_SLOT).count(),
        }
    }
}

fn read_ops(path: &Path) -> Result<Vec<Operation>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid operations in {}", path.display()))
}

/// Run `graphlog replay`.
pub fn run(config: &Path, args: &ReplayArgs) -> Result<()> {
    let config = GraphlogConfig::load(config)?;
    let log: OpLog = read_ops(&args.ops)?.into_iter().collect();
    info!(ops = log.len(), path = %args.ops.display(), "loaded operations");

    let graph = GraphShape::new(args.nodes, args.edges);
    let (modify, update) = config
        .replay
        .replayer()
        .replay(&graph, &log)
        .context("replay failed")?;

    let summary = Summary::new(&log, &modify, &update);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
