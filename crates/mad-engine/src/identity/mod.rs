//! File identity engine.
//!
//! A tracked file has two records: the transient identity record keyed by
//! `strong_hash(hostname || absolute_path)`, and the content record keyed
//! by the file's strong hash. Core keywords set on the file land in both;
//! transient-only keywords land in the identity record alone.

pub mod directory_config;
pub mod hook;
mod tracked_file;

pub use directory_config::{DirectoryConfigHook, DIRECTORY_CONFIG_FILE};
pub use hook::LoadHook;
pub use tracked_file::TrackedFile;

/// Field names the engine itself maintains on identity records.
pub mod fields {
    pub const FILENAME: &str = "filename";
    pub const HOSTNAME: &str = "hostname";
    pub const FAST_HASH: &str = "fast_hash";
    pub const STRONG_HASH: &str = "strong_hash";
}
