//! Scan orchestration.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use mad_core::errors::{IdentityError, ScanError};
use mad_core::tracing::metrics;
use mad_core::types::{Collection, Filter, FxHashMap};
use rayon::prelude::*;

use super::ignores::IgnorePatterns;
use super::incremental::{self, CACHED_FIELDS};
use super::types::{ScanOptions, ScanReport, ScanStats};
use super::walker;
use crate::batch::BatchSession;
use crate::context::Context;
use crate::counters::Counter;
use crate::identity::TrackedFile;
use crate::paths;

/// Synchronizes the catalog's view of a subtree with the filesystem.
pub struct Scanner<'a> {
    ctx: &'a Context,
    options: ScanOptions,
}

/// Per-file outcomes absorbed during the parallel pass.
#[derive(Default)]
struct Tally {
    processed: AtomicUsize,
    no_access: AtomicUsize,
    vanished: AtomicUsize,
    hash_failed: AtomicUsize,
}

impl<'a> Scanner<'a> {
    pub fn new(ctx: &'a Context, options: ScanOptions) -> Self {
        Self { ctx, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan `root`. Unreadable, vanished and unhashable files are counted
    /// and skipped; store failures abort the scan.
    pub fn scan(&self, root: &Path) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        let root = paths::absolutize(root).map_err(|source| ScanError::IoError {
            path: root.to_path_buf(),
            source,
        })?;
        if !root.is_dir() {
            return Err(ScanError::RootNotDirectory { path: root });
        }
        let store = self.ctx.store();
        let mut stats = ScanStats::default();

        let root_str = paths::path_string(&root);
        let prefix = if root_str.ends_with('/') {
            root_str
        } else {
            format!("{root_str}/")
        };
        let cached: FxHashMap<_, _> = store
            .find(
                Collection::Identity,
                &Filter::FilenamePrefix(prefix),
                Some(&CACHED_FIELDS[..]),
            )?
            .iter()
            .filter_map(incremental::cached_entry)
            .collect();
        stats.in_db = cached.len();

        let discovery_start = Instant::now();
        let ignores = IgnorePatterns::new(
            &root,
            &self.options.extra_ignore,
            self.options.ignore_file.as_deref(),
        )?;
        let discovery = walker::discover(&root, Arc::new(ignores));
        stats.discovery_ms = discovery_start.elapsed().as_millis() as u64;
        stats.on_fs = discovery.files.len();
        stats.walk_errors = discovery.errors;
        metrics::record(metrics::DISCOVERY_DURATION, stats.discovery_ms);

        let diff = incremental::compute_diff(&cached, &discovery.files, self.options.refresh);
        stats.changed = diff.changed.len();
        stats.deleted = store.delete_many(Collection::Identity, &diff.deleted_ids)?;
        tracing::info!(
            root = %root.display(),
            in_db = stats.in_db,
            on_fs = stats.on_fs,
            changed = stats.changed,
            deleted = stats.deleted,
            "scan diff"
        );

        let hashing_start = Instant::now();
        let bytes_before = self.ctx.counters().get(Counter::ChecksumBytes);
        let batch = BatchSession::begin(store);
        let tally = Tally::default();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.threads.unwrap_or(0))
            .build()
            .map_err(|e| ScanError::WorkerPool {
                message: e.to_string(),
            })?;
        pool.install(|| {
            diff.changed
                .par_iter()
                .try_for_each(|path| self.process(Path::new(path), &batch, &tally))
        })?;
        stats.hashing_ms = hashing_start.elapsed().as_millis() as u64;
        metrics::record(metrics::HASHING_DURATION, stats.hashing_ms);
        metrics::record(
            metrics::CHECKSUM_BYTES,
            self.ctx
                .counters()
                .get(Counter::ChecksumBytes)
                .saturating_sub(bytes_before),
        );

        let write_start = Instant::now();
        let outcome = batch.execute(store)?;
        stats.write_ms = write_start.elapsed().as_millis() as u64;
        stats.identity_written = outcome.identity_written;
        stats.content_written = outcome.content_written;

        stats.processed = tally.processed.into_inner();
        stats.no_access = tally.no_access.into_inner();
        stats.vanished = tally.vanished.into_inner();
        stats.hash_failed = tally.hash_failed.into_inner();

        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            metrics::record(
                metrics::SCAN_FILES_PER_SECOND,
                (stats.processed as f64 / elapsed) as u64,
            );
        }
        tracing::info!(
            processed = stats.processed,
            no_access = stats.no_access,
            vanished = stats.vanished,
            hash_failed = stats.hash_failed,
            identity_written = stats.identity_written,
            content_written = stats.content_written,
            "scan complete"
        );
        self.ctx.counters().report();

        Ok(ScanReport {
            root,
            stats,
            changed: diff.changed,
            deleted: diff.deleted_paths,
        })
    }

    fn process(&self, path: &Path, batch: &BatchSession, tally: &Tally) -> Result<(), IdentityError> {
        match TrackedFile::open(self.ctx, path, self.options.quick, Some(batch)) {
            Ok(mut file) => {
                if file.is_dirty() {
                    file.save()?;
                }
                tally.processed.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) if e.is_skippable() => {
                let counter = match e {
                    IdentityError::PermissionDenied { .. } => &tally.no_access,
                    IdentityError::NotFound { .. } => &tally.vanished,
                    _ => &tally.hash_failed,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(path = %path.display(), error = %e, "skipped");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
