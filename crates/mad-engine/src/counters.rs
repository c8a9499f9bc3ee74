//! Process-wide event counters reported at the end of a run.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    FilesOpened,
    IdentityCreated,
    IdentityLoaded,
    Checksum,
    ChecksumBytes,
    NoChecksum,
    Unquicken,
    Rechecksum,
    HashUnchanged,
    HashChanged,
    QuickDirty,
    ContentLoaded,
    Saved,
}

impl Counter {
    pub const ALL: [Counter; 13] = [
        Counter::FilesOpened,
        Counter::IdentityCreated,
        Counter::IdentityLoaded,
        Counter::Checksum,
        Counter::ChecksumBytes,
        Counter::NoChecksum,
        Counter::Unquicken,
        Counter::Rechecksum,
        Counter::HashUnchanged,
        Counter::HashChanged,
        Counter::QuickDirty,
        Counter::ContentLoaded,
        Counter::Saved,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Counter::FilesOpened => "files_opened",
            Counter::IdentityCreated => "identity_created",
            Counter::IdentityLoaded => "identity_loaded",
            Counter::Checksum => "checksum",
            Counter::ChecksumBytes => "checksum_bytes",
            Counter::NoChecksum => "no_checksum",
            Counter::Unquicken => "unquicken",
            Counter::Rechecksum => "rechecksum",
            Counter::HashUnchanged => "hash_unchanged",
            Counter::HashChanged => "hash_changed",
            Counter::QuickDirty => "quick_dirty",
            Counter::ContentLoaded => "content_loaded",
            Counter::Saved => "saved",
        }
    }
}

/// Lock-free counter table, safe to bump from scan workers.
#[derive(Debug, Default)]
pub struct Counters {
    values: [AtomicU64; Counter::ALL.len()],
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&self, counter: Counter, n: u64) {
        self.values[counter as usize].fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.values[counter as usize].load(Ordering::Relaxed)
    }

    /// Non-zero counters by name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        Counter::ALL
            .iter()
            .map(|&c| (c.name(), self.get(c)))
            .filter(|&(_, v)| v > 0)
            .collect()
    }

    /// Log every non-zero counter at info level.
    pub fn report(&self) {
        for (name, value) in self.snapshot() {
            tracing::info!(counter = name, value, "counter");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_skips_zeroes() {
        let counters = Counters::new();
        counters.incr(Counter::Checksum);
        counters.add(Counter::ChecksumBytes, 42);
        let snap = counters.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap["checksum"], 1);
        assert_eq!(snap["checksum_bytes"], 42);
    }

    #[test]
    fn indices_cover_all_counters() {
        for (i, c) in Counter::ALL.iter().enumerate() {
            assert_eq!(*c as usize, i);
        }
    }
}
