//! `shelfsync`: provision shelves, then reconcile shelf links.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use shelfsync_core::{config, Provisioner};
use shelfsync_sync::{catalog, library, pipeline, RunOptions, Silent};

use crate::report::Reporter;

/// Arguments for a sync run.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Print a report of created shelves and added/deleted links.
    #[arg(long)]
    pub log: bool,

    /// Show what would change without writing to the library.
    #[arg(long)]
    pub dry_run: bool,

    /// Config file to use instead of `~/.shelfsync/config.yaml`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = match self.config.as_deref() {
            Some(path) => config::load_from(path),
            None => config::load(),
        }
        .context("failed to load config")?;

        let catalog_db = catalog::open(&config.catalog_db).with_context(|| {
            format!("failed to open catalog {}", config.catalog_db.display())
        })?;
        let mut library_db = library::open(&config.library_db).with_context(|| {
            format!("failed to open library {}", config.library_db.display())
        })?;

        let options = RunOptions {
            provisioner: Provisioner::new(config.owner_id),
            removal_mode: config.removal_policy,
            dry_run: self.dry_run,
        };
        let now = Local::now().naive_local();

        let outcome = if self.log {
            let books = catalog::read_books(&catalog_db).context("failed to read catalog books")?;
            let mut reporter = Reporter::new(books, config.report_width, self.dry_run);
            pipeline::run(&catalog_db, &mut library_db, now, &options, &mut reporter)
        } else {
            pipeline::run(&catalog_db, &mut library_db, now, &options, &mut Silent)
        }
        .context("sync failed")?;

        tracing::info!(
            "{}done: {} shelf(s) created, {} link(s) added, {} link(s) removed",
            if outcome.dry_run { "[dry-run] " } else { "" },
            outcome.created.len(),
            outcome.reconciliation.to_add.len(),
            outcome.reconciliation.to_remove.len()
        );
        Ok(())
    }
}
