//! # shelfsync-sync
//!
//! SQLite adapters for the catalog and library databases, plus the run
//! pipeline that provisions shelves and reconciles links.
//!
//! Call [`pipeline::run`] with an open catalog connection and an open
//! library connection.

pub mod catalog;
pub mod error;
pub mod library;
pub mod pipeline;
pub mod report;

pub use error::SyncError;
pub use pipeline::{run, RunObserver, RunOptions, RunOutcome, Silent};
