//! Top-level mad configuration with layered resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{HostConfig, KeywordConfig, ScanConfig, StoreConfig};
use crate::errors::ConfigError;

/// Project-level config file name, looked up in the scan root.
pub const PROJECT_CONFIG_FILE: &str = "mad.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`MAD_*`)
/// 3. Project config (`mad.toml` in the root)
/// 4. User config (`~/.mad/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MadConfig {
    pub host: HostConfig,
    pub store: StoreConfig,
    pub scan: ScanConfig,
    pub keywords: BTreeMap<String, KeywordConfig>,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub hostname: Option<String>,
    pub store_path: Option<PathBuf>,
    pub scan_threads: Option<usize>,
    pub quick: Option<bool>,
    pub refresh: Option<bool>,
}

impl MadConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                Self::merge_toml_file(&mut config, &user_config_path)?;
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: MadConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &MadConfig) -> Result<(), ConfigError> {
        if let Some(ref hostname) = config.host.hostname {
            if hostname.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "host.hostname".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        if config.scan.threads == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scan.threads".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.store.read_pool_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "store.read_pool_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for (name, keyword) in &config.keywords {
            let Some(ref target) = keyword.alias else {
                continue;
            };
            if !config.keywords.contains_key(target) {
                return Err(ConfigError::ValidationFailed {
                    field: format!("keywords.{name}.alias"),
                    message: format!("unknown keyword {target}"),
                });
            }
            // Follow the chain; more hops than keywords means a cycle.
            let mut current = target;
            let mut hops = 0;
            while let Some(next) = config.keywords.get(current).and_then(|k| k.alias.as_ref()) {
                hops += 1;
                if hops > config.keywords.len() {
                    return Err(ConfigError::ValidationFailed {
                        field: format!("keywords.{name}.alias"),
                        message: "alias cycle".to_string(),
                    });
                }
                current = next;
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.mad/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        super::mad_home().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut MadConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: MadConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut MadConfig, other: &MadConfig) {
        // Host
        if other.host.hostname.is_some() {
            base.host.hostname = other.host.hostname.clone();
        }

        // Store
        if other.store.path.is_some() {
            base.store.path = other.store.path.clone();
        }
        if other.store.read_pool_size.is_some() {
            base.store.read_pool_size = other.store.read_pool_size;
        }

        // Scan
        if other.scan.threads.is_some() {
            base.scan.threads = other.scan.threads;
        }
        if other.scan.quick.is_some() {
            base.scan.quick = other.scan.quick;
        }
        if other.scan.refresh.is_some() {
            base.scan.refresh = other.scan.refresh;
        }
        if !other.scan.extra_ignore.is_empty() {
            base.scan.extra_ignore = other.scan.extra_ignore.clone();
        }
        if other.scan.ignore_file.is_some() {
            base.scan.ignore_file = other.scan.ignore_file.clone();
        }

        // Keywords merge per name; a redefined keyword replaces the old one.
        for (name, keyword) in &other.keywords {
            base.keywords.insert(name.clone(), keyword.clone());
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `MAD_HOSTNAME`, `MAD_STORE_PATH`, `MAD_SCAN_THREADS`, etc.
    fn apply_env_overrides(config: &mut MadConfig) {
        if let Ok(val) = std::env::var("MAD_HOSTNAME") {
            config.host.hostname = Some(val);
        }
        if let Ok(val) = std::env::var("MAD_STORE_PATH") {
            config.store.path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("MAD_SCAN_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("MAD_SCAN_QUICK") {
            if let Ok(v) = val.parse::<bool>() {
                config.scan.quick = Some(v);
            }
        }
        if let Ok(val) = std::env::var("MAD_SCAN_REFRESH") {
            if let Ok(v) = val.parse::<bool>() {
                config.scan.refresh = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut MadConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.hostname {
            config.host.hostname = Some(v.clone());
        }
        if let Some(ref v) = cli.store_path {
            config.store.path = Some(v.clone());
        }
        if let Some(v) = cli.scan_threads {
            config.scan.threads = Some(v);
        }
        if let Some(v) = cli.quick {
            config.scan.quick = Some(v);
        }
        if let Some(v) = cli.refresh {
            config.scan.refresh = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
