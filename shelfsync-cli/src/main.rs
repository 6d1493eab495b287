//! Shelfsync: mirror catalog tags into library shelves.
//!
//! # Usage
//!
//! ```text
//! shelfsync [--log] [--dry-run] [--config <path>]
//! ```
//!
//! Reads `~/.shelfsync/config.yaml` unless `--config` is given. Exits
//! non-zero on any database or config failure.

mod commands;
mod report;

use anyhow::Result;
use clap::Parser;

use commands::sync::SyncArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "shelfsync",
    version,
    about = "Create a library shelf per catalog tag and keep shelf membership in step",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.sync.log);
    cli.sync.run()
}

/// Log to stderr so stdout carries only the report. `RUST_LOG` wins when set.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
