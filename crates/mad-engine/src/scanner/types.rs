//! Scanner data types.

use std::path::PathBuf;

use mad_core::config::ScanConfig;
use serde::Serialize;

/// Scan flags and filters.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Re-touch every live file regardless of its cached stat triple.
    pub refresh: bool,
    /// Skip content hashing.
    pub quick: bool,
    /// Worker threads; `None` lets rayon decide.
    pub threads: Option<usize>,
    pub extra_ignore: Vec<String>,
    pub ignore_file: Option<PathBuf>,
}

impl ScanOptions {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            refresh: config.effective_refresh(),
            quick: config.effective_quick(),
            threads: config.threads,
            extra_ignore: config.extra_ignore.clone(),
            ignore_file: config.effective_ignore_file(),
        }
    }
}

/// The change-detection triple minus the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatKey {
    pub mtime_secs: i64,
    pub mtime_nanos: u32,
    pub size: u64,
}

/// A regular file found on disk.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: String,
    pub key: StatKey,
}

/// What the catalog remembers about a path.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub id: String,
    /// `None` when the stored record lacks a usable stat triple.
    pub key: Option<StatKey>,
}

/// Classification of the live tree against the catalog.
#[derive(Debug, Clone, Default)]
pub struct ScanDiff {
    pub changed: Vec<String>,
    pub deleted_paths: Vec<String>,
    pub deleted_ids: Vec<String>,
    pub unchanged: usize,
}

/// Advisory counters for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub in_db: usize,
    pub on_fs: usize,
    pub changed: usize,
    pub deleted: usize,
    pub processed: usize,
    pub no_access: usize,
    pub vanished: usize,
    pub hash_failed: usize,
    pub walk_errors: usize,
    pub identity_written: usize,
    pub content_written: usize,
    pub discovery_ms: u64,
    pub hashing_ms: u64,
    pub write_ms: u64,
}

/// Result of [`Scanner::scan`](super::Scanner::scan).
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub stats: ScanStats,
    pub changed: Vec<String>,
    pub deleted: Vec<String>,
}
