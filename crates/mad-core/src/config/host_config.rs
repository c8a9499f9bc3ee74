//! Host identity configuration.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Host settings. The hostname participates in every transient id, so
/// overriding it re-keys every identity record written afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Explicit hostname. Falls back to the OS hostname.
    pub hostname: Option<String>,
}

impl HostConfig {
    /// Resolve the effective hostname.
    pub fn effective_hostname(&self) -> Result<String, ConfigError> {
        if let Some(ref name) = self.hostname {
            return Ok(name.clone());
        }
        let name = hostname::get().map_err(|e| ConfigError::Hostname {
            message: e.to_string(),
        })?;
        name.into_string().map_err(|raw| ConfigError::Hostname {
            message: format!("hostname is not valid UTF-8: {raw:?}"),
        })
    }
}
