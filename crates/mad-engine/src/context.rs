//! The explicit application context shared by every engine.

use std::sync::Arc;

use mad_core::config::MadConfig;
use mad_core::errors::{ConfigError, MadError};
use mad_core::keywords::KeywordSchema;
use mad_core::traits::DocumentStore;
use mad_storage::SqliteStore;

use crate::counters::Counters;
use crate::identity::LoadHook;

/// Store handle, hostname, keyword schema, load hooks and counters.
///
/// Constructed once per process and passed by reference; the scanner shares
/// it across its worker threads.
pub struct Context {
    store: Arc<dyn DocumentStore>,
    hostname: String,
    schema: KeywordSchema,
    hooks: Vec<Arc<dyn LoadHook>>,
    counters: Counters,
}

impl Context {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        hostname: impl Into<String>,
        schema: KeywordSchema,
    ) -> Self {
        Self {
            store,
            hostname: hostname.into(),
            schema,
            hooks: Vec::new(),
            counters: Counters::new(),
        }
    }

    /// Build a context from a resolved configuration, opening the SQLite
    /// store it names.
    pub fn open(config: &MadConfig) -> Result<Self, MadError> {
        let hostname = config.host.effective_hostname()?;
        let path = config
            .store
            .effective_path()
            .ok_or_else(|| ConfigError::ValidationFailed {
                field: "store.path".to_string(),
                message: "no store path configured and no home directory".to_string(),
            })?;
        let store = SqliteStore::open(&path, config.store.effective_read_pool_size())?;
        tracing::info!(path = %path.display(), hostname = %hostname, "opened catalog");
        Ok(Self::new(
            Arc::new(store),
            hostname,
            KeywordSchema::new(config.keywords.clone()),
        ))
    }

    /// Register a hook run after every identity load, in registration order.
    pub fn with_hook(mut self, hook: Arc<dyn LoadHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn schema(&self) -> &KeywordSchema {
        &self.schema
    }

    pub fn hooks(&self) -> &[Arc<dyn LoadHook>] {
        &self.hooks
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }
}
