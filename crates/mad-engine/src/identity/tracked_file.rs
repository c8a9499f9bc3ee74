//! Per-file identity record lifecycle.

use std::fs::{self, File, Metadata};
use std::path::{Path, PathBuf};

use mad_core::errors::IdentityError;
use mad_core::keywords::{apply_value, ResolvedKey};
use mad_core::types::{Collection, Document, ID_FIELD};
use serde_json::Value;

use super::fields::{FAST_HASH, FILENAME, HOSTNAME, STRONG_HASH};
use crate::batch::BatchSession;
use crate::context::Context;
use crate::counters::Counter;
use crate::hasher::{self, FileHashes, QUICK_SENTINEL};
use crate::paths;
use crate::stat::StatSnapshot;

/// A file's reconciled identity record plus, outside quick mode, its
/// content record.
///
/// Construction stats the file, loads or creates both records, reconciles
/// them against the live filesystem, persists any change and runs the
/// context's load hooks. Saves go to `batch` when one is given.
pub struct TrackedFile<'a> {
    ctx: &'a Context,
    batch: Option<&'a BatchSession>,
    path: PathBuf,
    id: String,
    quick: bool,
    dirty: bool,
    identity: Document,
    content: Option<Document>,
}

impl<'a> TrackedFile<'a> {
    pub fn open(
        ctx: &'a Context,
        path: &Path,
        quick: bool,
        batch: Option<&'a BatchSession>,
    ) -> Result<Self, IdentityError> {
        let path =
            paths::absolutize(path).map_err(|e| IdentityError::from_io(path.to_path_buf(), e))?;
        let meta = fs::metadata(&path).map_err(|e| IdentityError::from_io(path.clone(), e))?;
        File::open(&path).map_err(|e| IdentityError::from_io(path.clone(), e))?;

        let id = hasher::transient_id(ctx.hostname(), &paths::path_string(&path));
        ctx.counters().incr(Counter::FilesOpened);

        let mut file = Self {
            ctx,
            batch,
            path,
            id,
            quick,
            dirty: false,
            identity: Document::new(),
            content: None,
        };

        match ctx.store().find_one(Collection::Identity, &file.id)? {
            None => file.create(&meta)?,
            Some(doc) => file.load(doc, &meta)?,
        }
        if !quick {
            file.load_content()?;
        }
        if file.dirty {
            file.save()?;
        }

        for hook in ctx.hooks() {
            hook.on_load(ctx, &mut file)?;
        }
        Ok(file)
    }

    fn create(&mut self, meta: &Metadata) -> Result<(), IdentityError> {
        tracing::debug!(path = %self.path.display(), "creating identity record");
        self.ctx.counters().incr(Counter::IdentityCreated);

        self.identity.insert(ID_FIELD.into(), self.id.clone().into());
        self.identity
            .insert(FILENAME.into(), paths::path_string(&self.path).into());
        self.identity
            .insert(HOSTNAME.into(), self.ctx.hostname().into());

        if self.quick {
            self.ctx.counters().incr(Counter::NoChecksum);
            self.mark_quick();
        } else {
            let hashes = self.compute_hashes()?;
            self.set_hashes(&hashes);
        }
        StatSnapshot::from_metadata(meta).apply_to(&mut self.identity);
        self.dirty = true;
        Ok(())
    }

    fn load(&mut self, doc: Document, meta: &Metadata) -> Result<(), IdentityError> {
        self.ctx.counters().incr(Counter::IdentityLoaded);
        self.identity = doc;

        let mut unquickened = false;
        if !self.quick && self.is_quick_record() {
            tracing::debug!(path = %self.path.display(), "unquicken");
            self.ctx.counters().incr(Counter::Unquicken);
            let hashes = self.compute_hashes()?;
            self.set_hashes(&hashes);
            self.dirty = true;
            unquickened = true;
        }

        if StatSnapshot::from_metadata(meta).apply_to(&mut self.identity) {
            self.dirty = true;
            self.on_stat_drift(unquickened)?;
        }
        Ok(())
    }

    /// React to stat drift on an existing record. Returns true when the
    /// content hash changed.
    fn on_stat_drift(&mut self, just_hashed: bool) -> Result<bool, IdentityError> {
        if self.quick {
            // Hashes are kept; only a full pass re-reads content.
            self.ctx.counters().incr(Counter::QuickDirty);
            return Ok(false);
        }
        if just_hashed {
            return Ok(false);
        }

        self.ctx.counters().incr(Counter::Rechecksum);
        let previous = self.strong_hash().to_string();
        let hashes = self.compute_hashes()?;
        if hashes.strong == previous {
            tracing::debug!(path = %self.path.display(), "stat drift, content unchanged");
            self.ctx.counters().incr(Counter::HashUnchanged);
            Ok(false)
        } else {
            tracing::debug!(path = %self.path.display(), "content changed");
            self.ctx.counters().incr(Counter::HashChanged);
            self.set_hashes(&hashes);
            Ok(true)
        }
    }

    fn load_content(&mut self) -> Result<(), IdentityError> {
        let strong = self.strong_hash().to_string();
        match self.ctx.store().find_one(Collection::Content, &strong)? {
            Some(content) => {
                self.ctx.counters().incr(Counter::ContentLoaded);
                for (key, value) in &content {
                    if key == ID_FIELD {
                        continue;
                    }
                    if self.identity.get(key) != Some(value) {
                        self.identity.insert(key.clone(), value.clone());
                        self.dirty = true;
                    }
                }
                self.content = Some(content);
            }
            None => {
                let mut stub = Document::new();
                stub.insert(ID_FIELD.into(), strong.into());
                stub.insert(FAST_HASH.into(), self.fast_hash().into());
                self.content = Some(stub);
            }
        }
        Ok(())
    }

    fn compute_hashes(&self) -> Result<FileHashes, IdentityError> {
        let hashes = hasher::hash_file(&self.path).map_err(|source| {
            tracing::warn!(path = %self.path.display(), error = %source, "cannot generate checksum");
            IdentityError::HashingIo {
                path: self.path.clone(),
                source,
            }
        })?;
        self.ctx.counters().incr(Counter::Checksum);
        self.ctx.counters().add(Counter::ChecksumBytes, hashes.bytes);
        Ok(hashes)
    }

    fn set_hashes(&mut self, hashes: &FileHashes) {
        self.identity
            .insert(FAST_HASH.into(), hashes.fast.clone().into());
        self.identity
            .insert(STRONG_HASH.into(), hashes.strong.clone().into());
    }

    fn mark_quick(&mut self) {
        self.identity.insert(FAST_HASH.into(), QUICK_SENTINEL.into());
        self.identity.insert(STRONG_HASH.into(), QUICK_SENTINEL.into());
    }

    fn is_quick_record(&self) -> bool {
        self.strong_hash() == QUICK_SENTINEL || self.fast_hash() == QUICK_SENTINEL
    }

    /// Re-stat the file and reconcile drift, saving if anything changed.
    /// Returns whether the stat snapshot drifted.
    pub fn refresh(&mut self) -> Result<bool, IdentityError> {
        let meta =
            fs::metadata(&self.path).map_err(|e| IdentityError::from_io(self.path.clone(), e))?;
        let drift = StatSnapshot::from_metadata(&meta).apply_to(&mut self.identity);
        if drift {
            self.dirty = true;
            if self.on_stat_drift(false)? {
                self.load_content()?;
            }
        }
        if self.dirty {
            self.save()?;
        }
        Ok(drift)
    }

    /// Set a keyword from its raw string form.
    pub fn set(&mut self, raw_key: &str, raw_value: &str) -> Result<bool, IdentityError> {
        let key = self.ctx.schema().resolve(raw_key)?;
        let value = key.value_type.transform(&key.canonical, raw_value)?;
        self.apply(&key, value)
    }

    /// Set a keyword from an already-typed value.
    pub fn set_value(&mut self, raw_key: &str, value: &Value) -> Result<bool, IdentityError> {
        let key = self.ctx.schema().resolve(raw_key)?;
        let value = key.value_type.coerce(&key.canonical, value)?;
        self.apply(&key, value)
    }

    /// Apply every entry of `map`, one `set` per list element.
    pub fn update(&mut self, map: &Document) -> Result<bool, IdentityError> {
        let mut changed = false;
        for (key, value) in map {
            match value {
                Value::Array(items) => {
                    for item in items {
                        changed |= self.set_value(key, item)?;
                    }
                }
                other => changed |= self.set_value(key, other)?,
            }
        }
        Ok(changed)
    }

    fn apply(&mut self, key: &ResolvedKey, value: Value) -> Result<bool, IdentityError> {
        if !key.categories.transient {
            tracing::debug!(key = %key.canonical, "not a transient keyword, ignored");
            return Ok(false);
        }

        let mut changed = apply_value(key.shape, &mut self.identity, &key.canonical, value);
        tracing::debug!(key = %key.canonical, path = %self.path.display(), changed, "set");

        if key.categories.core && !self.quick {
            if let (Some(content), Some(merged)) =
                (self.content.as_mut(), self.identity.get(&key.canonical))
            {
                if content.get(&key.canonical) != Some(merged) {
                    content.insert(key.canonical.clone(), merged.clone());
                    changed = true;
                }
            }
        }

        if changed {
            self.dirty = true;
            self.save()?;
        }
        Ok(changed)
    }

    /// Persist the identity record, and the content record when it carries
    /// more than its id and fast hash.
    pub fn save(&mut self) -> Result<(), IdentityError> {
        tracing::debug!(path = %self.path.display(), batched = self.batch.is_some(), "saving");
        self.write(Collection::Identity, self.id.clone(), self.identity.clone())?;

        if !self.quick {
            if let Some(content) = self.content.as_ref().filter(|c| has_payload(c)) {
                let id = self.strong_hash().to_string();
                self.write(Collection::Content, id, content.clone())?;
            }
        }

        self.dirty = false;
        self.ctx.counters().incr(Counter::Saved);
        Ok(())
    }

    fn write(&self, collection: Collection, id: String, doc: Document) -> Result<(), IdentityError> {
        match self.batch {
            Some(batch) => batch.enqueue(collection, id, doc),
            None => self.ctx.store().upsert(collection, &id, &doc)?,
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn strong_hash(&self) -> &str {
        self.identity
            .get(STRONG_HASH)
            .and_then(Value::as_str)
            .unwrap_or(QUICK_SENTINEL)
    }

    pub fn fast_hash(&self) -> &str {
        self.identity
            .get(FAST_HASH)
            .and_then(Value::as_str)
            .unwrap_or(QUICK_SENTINEL)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_quick(&self) -> bool {
        self.quick
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.identity.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.identity.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.identity.keys()
    }

    pub fn identity(&self) -> &Document {
        &self.identity
    }

    /// The linked content record; `None` in quick mode.
    pub fn content(&self) -> Option<&Document> {
        self.content.as_ref()
    }
}

fn has_payload(content: &Document) -> bool {
    content.keys().any(|k| k != ID_FIELD && k != FAST_HASH)
}

impl std::fmt::Debug for TrackedFile<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedFile")
            .field("path", &self.path)
            .field("id", &self.id)
            .field("quick", &self.quick)
            .field("dirty", &self.dirty)
            .finish()
    }
}
