//! Configuration system for mad.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod host_config;
pub mod keyword_config;
pub mod mad_config;
pub mod scan_config;
pub mod store_config;

pub use host_config::HostConfig;
pub use keyword_config::KeywordConfig;
pub use mad_config::{CliOverrides, MadConfig};
pub use scan_config::ScanConfig;
pub use store_config::StoreConfig;

/// Returns the user-level mad directory: `~/.mad/`.
pub fn mad_home() -> Option<std::path::PathBuf> {
    home_dir().map(|h| h.join(".mad"))
}

/// Cross-platform home directory resolution.
pub fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
