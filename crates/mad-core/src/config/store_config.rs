//! Document store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the catalog database lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. Defaults to `~/.mad/catalog.db`.
    pub path: Option<PathBuf>,
    /// Read pool size for file-backed stores.
    pub read_pool_size: Option<usize>,
}

impl StoreConfig {
    pub fn effective_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| super::mad_home().map(|d| d.join("catalog.db")))
    }

    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size.unwrap_or(4)
    }
}
