//! Run pipeline: provision shelves, then reconcile links.
//!
//! ## Phases
//!
//! 1. Load the catalog snapshot and the library's link snapshot.
//! 2. Provision: create a shelf for every tag name without one. Committed on
//!    its own, so a later failure leaves only harmless extra shelves.
//! 3. Reconcile: re-read shelves, diff links, insert then delete inside one
//!    transaction.
//!
//! In dry-run mode both phases share one transaction that is rolled back at
//! the end. The outcome is what a real run would have done.
//!
//! Concurrent runs against one library are not safe; callers serialize them.

use std::collections::{BTreeSet, HashSet};

use rusqlite::{Connection, Transaction};

use shelfsync_core::{
    provision,
    reconcile::{self, Reconciliation},
    NewShelf, Provisioner, RemovalMode, RunTimestamp, Shelf, ShelfLink,
};

use crate::catalog::{self, CatalogSnapshot};
use crate::error::{db_err, SyncError};
use crate::library;

/// Settings for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub provisioner: Provisioner,
    pub removal_mode: RemovalMode,
    /// Compute everything, persist nothing.
    pub dry_run: bool,
}

/// Everything a run computed.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub created: Vec<NewShelf>,
    pub reconciliation: Reconciliation,
    /// Library shelves after provisioning, for resolving names in reports.
    pub shelves: Vec<Shelf>,
    pub dry_run: bool,
}

/// Hooks invoked as each phase completes. Reports that print progressively
/// implement this so a later failure does not swallow earlier results.
pub trait RunObserver {
    fn shelves_provisioned(&mut self, _created: &[NewShelf]) {}
    fn links_reconciled(&mut self, _reconciliation: &Reconciliation, _shelves: &[Shelf]) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default)]
pub struct Silent;

impl RunObserver for Silent {}

/// Run both phases against open connections.
pub fn run(
    catalog_db: &Connection,
    library_db: &mut Connection,
    now: RunTimestamp,
    options: &RunOptions,
    observer: &mut dyn RunObserver,
) -> Result<RunOutcome, SyncError> {
    let snapshot = catalog::read_snapshot(catalog_db)?;
    let dest_links = library::read_links(library_db)?;
    tracing::info!("library snapshot: {} shelf link(s)", dest_links.len());

    if options.dry_run {
        let tx = begin(library_db)?;
        let created = provision_phase(&tx, &snapshot, &options.provisioner, now)?;
        observer.shelves_provisioned(&created);
        let (shelves, reconciliation) =
            reconcile_phase(&tx, &snapshot, &dest_links, options.removal_mode, now)?;
        observer.links_reconciled(&reconciliation, &shelves);
        tx.rollback()
            .map_err(|e| db_err("rolling back dry run", e))?;
        tracing::info!("[dry-run] rolled back all library changes");

        return Ok(RunOutcome {
            created,
            reconciliation,
            shelves,
            dry_run: true,
        });
    }

    let tx = begin(library_db)?;
    let created = provision_phase(&tx, &snapshot, &options.provisioner, now)?;
    tx.commit()
        .map_err(|e| db_err("committing new shelves", e))?;
    observer.shelves_provisioned(&created);

    let tx = begin(library_db)?;
    let (shelves, reconciliation) =
        reconcile_phase(&tx, &snapshot, &dest_links, options.removal_mode, now)?;
    tx.commit()
        .map_err(|e| db_err("committing shelf links", e))?;
    observer.links_reconciled(&reconciliation, &shelves);

    Ok(RunOutcome {
        created,
        reconciliation,
        shelves,
        dry_run: false,
    })
}

fn begin(conn: &mut Connection) -> Result<Transaction<'_>, SyncError> {
    conn.transaction()
        .map_err(|e| db_err("beginning library transaction", e))
}

fn provision_phase(
    conn: &Connection,
    snapshot: &CatalogSnapshot,
    provisioner: &Provisioner,
    now: RunTimestamp,
) -> Result<Vec<NewShelf>, SyncError> {
    let existing: HashSet<String> = library::read_shelves(conn)?
        .into_iter()
        .map(|shelf| shelf.name)
        .collect();
    let wanted = provision::tag_names(&snapshot.links);

    let created = provisioner.provision(&existing, &wanted, now)?;
    library::insert_shelves(conn, &created)?;
    tracing::info!(
        "provisioned {} new shelf(s) for {} tag(s)",
        created.len(),
        wanted.len()
    );
    Ok(created)
}

fn reconcile_phase(
    conn: &Connection,
    snapshot: &CatalogSnapshot,
    dest_links: &BTreeSet<ShelfLink>,
    removal_mode: RemovalMode,
    now: RunTimestamp,
) -> Result<(Vec<Shelf>, Reconciliation), SyncError> {
    let shelves = library::read_shelves(conn)?;
    let mapping = reconcile::name_to_id(&shelves);
    let policy = removal_mode.into_policy(snapshot.tags.clone());

    let reconciliation =
        reconcile::reconcile_with(&snapshot.links, dest_links, &mapping, now, &policy);

    let added = library::insert_links(conn, &reconciliation.to_add)?;
    let removed = library::delete_links(conn, &reconciliation.to_remove)?;
    tracing::info!(
        "reconciled shelf links: {added} added, {removed} removed, {} unmapped tag(s)",
        reconciliation.gaps.len()
    );
    Ok((shelves, reconciliation))
}
