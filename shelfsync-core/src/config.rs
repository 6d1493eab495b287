//! YAML run configuration.
//!
//! # Location
//!
//! ```text
//! ~/.shelfsync/
//!   config.yaml
//! ```
//!
//! # API pattern
//!
//! - `load_at(home: &Path)`: explicit home; used in tests with `TempDir`
//! - `load()`: derives home from `dirs::home_dir()`, delegates to `load_at`
//! - `load_from(path)`: explicit file, used for `--config`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::provision::DEFAULT_OWNER_ID;
use crate::reconcile::RemovalPolicy;
use crate::types::TagName;

/// Truncation width for report columns.
pub const DEFAULT_REPORT_WIDTH: usize = 50;

/// How library links on shelves without a catalog tag are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemovalMode {
    #[default]
    Sweep,
    TaggedShelvesOnly,
}

impl RemovalMode {
    /// Resolve to a [`RemovalPolicy`] given every tag the catalog knows.
    pub fn into_policy(self, catalog_tags: BTreeSet<TagName>) -> RemovalPolicy {
        match self {
            RemovalMode::Sweep => RemovalPolicy::Sweep,
            RemovalMode::TaggedShelvesOnly => RemovalPolicy::TaggedShelvesOnly { catalog_tags },
        }
    }
}

/// Contents of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog database (`metadata.db`), read-only.
    pub catalog_db: PathBuf,
    /// Library database (`app.db`), read-write.
    pub library_db: PathBuf,
    #[serde(default = "default_owner_id")]
    pub owner_id: i64,
    #[serde(default)]
    pub removal_policy: RemovalMode,
    #[serde(default = "default_report_width")]
    pub report_width: usize,
}

fn default_owner_id() -> i64 {
    DEFAULT_OWNER_ID
}

fn default_report_width() -> usize {
    DEFAULT_REPORT_WIDTH
}

/// `<home>/.shelfsync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".shelfsync").join("config.yaml")
}

/// Load the config from `<home>/.shelfsync/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    load_at(&home)
}

/// Load the config from an explicit file.
///
/// Returns `ConfigError::NotFound` if absent and `ConfigError::Parse` (with
/// path + line context) if malformed.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
