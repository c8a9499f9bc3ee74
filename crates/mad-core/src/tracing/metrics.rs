//! Structured span field definitions for mad metrics.
//!
//! Consistent field names across subsystems keep log queries simple.

/// Scanner: files processed per second.
pub const SCAN_FILES_PER_SECOND: &str = "scan_files_per_second";

/// Scanner: file discovery phase duration in milliseconds.
pub const DISCOVERY_DURATION: &str = "discovery_duration";

/// Scanner: per-file identity pass duration in milliseconds.
pub const HASHING_DURATION: &str = "hashing_duration";

/// Storage: batch write time in milliseconds.
pub const BATCH_WRITE_TIME: &str = "batch_write_time";

/// Hasher: bytes consumed.
pub const CHECKSUM_BYTES: &str = "checksum_bytes";

/// Emit one metric sample as a structured event.
pub fn record(metric: &'static str, value: u64) {
    tracing::debug!(metric, value, "metric");
}
