//! Scanner configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Scanner settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Worker threads for the per-file pass. Absent means rayon's default.
    pub threads: Option<usize>,
    /// Skip content hashing.
    pub quick: Option<bool>,
    /// Re-touch every file regardless of its cached stat triple.
    pub refresh: Option<bool>,
    /// Additional gitignore-style patterns.
    pub extra_ignore: Vec<String>,
    /// Global ignore file. Defaults to `~/.madignore`.
    pub ignore_file: Option<PathBuf>,
}

impl ScanConfig {
    pub fn effective_quick(&self) -> bool {
        self.quick.unwrap_or(false)
    }

    pub fn effective_refresh(&self) -> bool {
        self.refresh.unwrap_or(false)
    }

    pub fn effective_ignore_file(&self) -> Option<PathBuf> {
        self.ignore_file
            .clone()
            .or_else(|| super::home_dir().map(|h| h.join(".madignore")))
    }
}
