//! Error types for shelfsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use shelfsync_core::ProvisionError;

/// All errors that can abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A provisioning batch would create two shelves with the same name.
    #[error(transparent)]
    DuplicateName(#[from] ProvisionError),

    /// A read or write against either database failed.
    #[error("database error while {context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The configured database file does not exist.
    #[error("database not found at {path}")]
    MissingDatabase { path: PathBuf },
}

/// Convenience constructor for [`SyncError::Persistence`].
pub(crate) fn db_err(context: impl Into<String>, source: rusqlite::Error) -> SyncError {
    SyncError::Persistence {
        context: context.into(),
        source,
    }
}
