//! `graphlog stat`: resolve a URI through configured storage and print its size.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use graphlog::config::GraphlogConfig;
use graphlog::storage::Uri;

/// Arguments for `graphlog stat`.
#[derive(Args)]
pub struct StatArgs {
    /// Object location, e.g. `file:///data/g.log`, `mem://x` or a bare path.
    uri: String,
}

/// Run `graphlog stat`.
pub fn run(config: &Path, args: &StatArgs) -> Result<()> {
    let config = GraphlogConfig::load(config)?;
    let uri = Uri::parse(&args.uri).with_context(|| format!("invalid uri {:?}", args.uri))?;
    let registry = config
        .storage
        .build_registry()
        .context("could not initialize storage")?;
    let backend = registry.resolve(&uri)?;
    let stat = backend
        .stat(&uri)
        .with_context(|| format!("could not stat {uri}"))?;
    println!(
        "{}",
        serde_json::json!({ "uri": uri.to_string(), "scheme": backend.uri_scheme(), "size": stat.size })
    );
    Ok(())
}
