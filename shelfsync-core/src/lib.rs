//! Shelfsync core library: domain types, provisioning, reconciliation, config.
//!
//! - [`types`]: newtypes and relation rows
//! - [`provision`]: [`Provisioner`], one shelf per catalog tag
//! - [`reconcile`]: [`reconcile()`], the link insert/delete diff
//! - [`config`]: `~/.shelfsync/config.yaml`
//! - [`error`]: [`ProvisionError`], [`ConfigError`]
//!
//! Nothing in this crate touches a database.

pub mod config;
pub mod error;
pub mod provision;
pub mod reconcile;
pub mod types;

pub use config::{Config, RemovalMode};
pub use error::{ConfigError, ProvisionError};
pub use provision::Provisioner;
pub use reconcile::{reconcile, reconcile_with, MappingGap, NameMap, Reconciliation, RemovalPolicy};
pub use types::{
    BookId, BookInfo, NewLink, NewShelf, RunTimestamp, Shelf, ShelfId, ShelfLink, SourceLink,
    TagName,
};
