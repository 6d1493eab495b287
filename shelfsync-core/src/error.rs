//! Error types for shelfsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while synthesizing new shelves.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProvisionError {
    /// Two rows in one insertion batch share a name.
    #[error("duplicate shelf name in provisioning batch: {name:?}")]
    DuplicateName { name: String },
}

/// Errors raised while locating or parsing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the file.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the file path and serde_yaml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,

    /// No config file at the expected path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },
}
