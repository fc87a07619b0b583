use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod replay_cmd;
mod stat_cmd;

/// Inspect graph mutation logs
///
/// Replays a fixture of property-graph operations against a base graph of
/// a given size and reports which properties the log would change.
///
/// Set GRAPHLOG_LOG_FORMAT=json|pretty to see diagnostics on stderr;
/// RUST_LOG picks the filter.
#[derive(Parser)]
#[command(name = "graphlog")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(
    after_help = "See 'graphlog <command> --help' for more information on a specific command."
)]
struct Cli {
    /// Configuration file (missing file means all defaults).
    #[arg(long, global = true, env = "GRAPHLOG_CONFIG", default_value = "graphlog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON operations fixture and print the derived changes
    Replay(replay_cmd::ReplayArgs),

    /// Print the size of an object in configured storage
    Stat(stat_cmd::StatArgs),
}

fn main() -> Result<()> {
    let _format = graphlog::telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(ref args) => replay_cmd::run(&cli.config, args),
        Commands::Stat(ref args) => stat_cmd::run(&cli.config, args),
    }
}
