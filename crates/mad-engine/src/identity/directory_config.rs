//! Directory-level metadata from `mad.config` files.
//!
//! Every directory between a file and the filesystem root may carry a
//! `mad.config` TOML table of keywords. They are merged root-first, so a
//! deeper directory overrides its ancestors key by key, and the merged map
//! is applied to each loaded file through [`TrackedFile::update`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mad_core::errors::IdentityError;
use mad_core::keywords::{apply_value, KeywordSchema};
use mad_core::types::{Document, FxHashMap};
use serde_json::Value;

use super::{LoadHook, TrackedFile};
use crate::context::Context;

pub const DIRECTORY_CONFIG_FILE: &str = "mad.config";

/// `on_load` hook applying merged directory configuration.
#[derive(Default)]
pub struct DirectoryConfigHook {
    cache: Mutex<FxHashMap<PathBuf, Arc<Document>>>,
}

impl DirectoryConfigHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merged configuration that applies to files directly inside `dir`.
    pub fn merged_for(&self, dir: &Path) -> Result<Arc<Document>, IdentityError> {
        if let Some(hit) = self.lock().get(dir) {
            return Ok(Arc::clone(hit));
        }

        let files: Vec<PathBuf> = dir
            .ancestors()
            .map(|d| d.join(DIRECTORY_CONFIG_FILE))
            .filter(|p| p.is_file())
            .collect();

        let mut merged = Document::new();
        for path in files.iter().rev() {
            merged.extend(read_config(path)?);
        }
        tracing::debug!(dir = %dir.display(), files = files.len(), "merged directory config");

        let merged = Arc::new(merged);
        self.lock().insert(dir.to_path_buf(), Arc::clone(&merged));
        Ok(merged)
    }

    /// Forget cached merges, e.g. after a `mad.config` was rewritten.
    pub fn invalidate(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<PathBuf, Arc<Document>>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LoadHook for DirectoryConfigHook {
    fn on_load(&self, _ctx: &Context, file: &mut TrackedFile<'_>) -> Result<(), IdentityError> {
        let Some(dir) = file.path().parent() else {
            return Ok(());
        };
        let data = self.merged_for(dir)?;
        if !data.is_empty() {
            file.update(&data)?;
        }
        Ok(())
    }
}

/// Write `raw_key = raw_value` into `dir/mad.config`, honouring the
/// keyword's shape. Returns whether the file changed.
pub fn set_directory_key(
    schema: &KeywordSchema,
    dir: &Path,
    raw_key: &str,
    raw_value: &str,
) -> Result<bool, IdentityError> {
    let key = schema.resolve(raw_key)?;
    let value = key.value_type.transform(&key.canonical, raw_value)?;

    let path = dir.join(DIRECTORY_CONFIG_FILE);
    let mut doc = if path.is_file() {
        read_config(&path)?
    } else {
        Document::new()
    };

    if !apply_value(key.shape, &mut doc, &key.canonical, value) {
        return Ok(false);
    }

    let text = toml::to_string(&doc).map_err(|e| hook_err(&path, e))?;
    fs::write(&path, text).map_err(|e| hook_err(&path, e))?;
    tracing::info!(path = %path.display(), key = %key.canonical, "directory config updated");
    Ok(true)
}

fn read_config(path: &Path) -> Result<Document, IdentityError> {
    let text = fs::read_to_string(path).map_err(|e| hook_err(path, e))?;
    let table: toml::Table = toml::from_str(&text).map_err(|e| hook_err(path, e))?;
    match serde_json::to_value(table).map_err(|e| hook_err(path, e))? {
        Value::Object(map) => Ok(map),
        _ => Ok(Document::new()),
    }
}

fn hook_err(path: &Path, e: impl std::fmt::Display) -> IdentityError {
    IdentityError::Hook {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
