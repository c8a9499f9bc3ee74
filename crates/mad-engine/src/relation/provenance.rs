//! A declared unit of provenance and its "already done?" check.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use mad_core::errors::{IdentityError, RelationError};
use mad_core::types::{Collection, Filter, IoClause, RelationSearch};

use super::io_spec::IoSpec;
use super::signals::{CheckOutcome, Signal};
use super::types::{IoCategory, IoEntry, RelationRecord, RelationState, EXECUTABLE_GROUP};
use crate::context::Context;
use crate::hasher;
use crate::identity::TrackedFile;
use crate::paths;

/// A script bound to the files it reads and writes.
///
/// Records are written once by [`Relation::save`]; a re-run declares a new
/// relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    record: RelationRecord,
}

impl Relation {
    /// Declare a relation in the current working directory.
    pub fn new(ctx: &Context) -> Result<Self, RelationError> {
        let cwd =
            std::env::current_dir().map_err(|source| RelationError::WorkingDirectory { source })?;
        Ok(Self::in_directory(ctx, &cwd))
    }

    pub fn in_directory(ctx: &Context, working_directory: &Path) -> Self {
        Self {
            record: RelationRecord {
                id: hasher::random_id(),
                time: Utc::now(),
                working_directory: paths::path_string(working_directory),
                hostname: ctx.hostname().to_string(),
                state: RelationState::Pending,
                script: None,
                template_fingerprint: None,
                io: Vec::new(),
            },
        }
    }

    pub fn from_record(record: RelationRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &RelationRecord {
        &self.record
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.record.time
    }

    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.record.time = time;
    }

    pub fn state(&self) -> RelationState {
        self.record.state
    }

    pub fn set_state(&mut self, state: RelationState) {
        self.record.state = state;
    }

    pub fn script(&self) -> Option<&str> {
        self.record.script.as_deref()
    }

    pub fn set_script(&mut self, script: impl Into<String>) {
        self.record.script = Some(script.into());
    }

    pub fn template_fingerprint(&self) -> Option<&str> {
        self.record.template_fingerprint.as_deref()
    }

    pub fn set_template_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.record.template_fingerprint = Some(fingerprint.into());
    }

    /// Fingerprint the template source this relation was rendered from.
    pub fn set_template_source(&mut self, source: &str) {
        self.record.template_fingerprint = Some(hasher::template_fingerprint(source));
    }

    pub fn io(&self) -> &[IoEntry] {
        &self.record.io
    }

    /// Declare an input or output. The group defaults to the category; the
    /// content hash is captured when the file exists.
    pub fn add_io(
        &mut self,
        ctx: &Context,
        category: IoCategory,
        filename: &Path,
        group: Option<&str>,
    ) -> Result<(), RelationError> {
        let path = paths::absolutize(filename)
            .map_err(|e| IdentityError::from_io(filename.to_path_buf(), e))?;
        let strong_hash = current_hash(ctx, &path)?;
        tracing::debug!(
            path = %path.display(),
            %category,
            hashed = strong_hash.is_some(),
            "add io"
        );
        self.record.io.push(IoEntry {
            category,
            group: group.unwrap_or(category.as_str()).to_string(),
            filename: paths::path_string(&path),
            strong_hash,
        });
        Ok(())
    }

    /// Declare an IO from a `group::filename` string.
    pub fn add_io_spec(
        &mut self,
        ctx: &Context,
        category: IoCategory,
        spec: &str,
    ) -> Result<(), RelationError> {
        let spec = IoSpec::parse(spec);
        self.add_io(ctx, category, &spec.filename, spec.group.as_deref())
    }

    /// Register an executable as an input of group `executable`. Bare names
    /// are looked up on `PATH`.
    pub fn add_executable(&mut self, ctx: &Context, name: &str) -> Result<PathBuf, RelationError> {
        let candidate = Path::new(name);
        let path = if candidate.exists() {
            candidate.to_path_buf()
        } else {
            which::which(name).map_err(|_| RelationError::ExecutableNotFound {
                name: name.to_string(),
            })?
        };
        self.add_io(ctx, IoCategory::Input, &path, Some(EXECUTABLE_GROUP))?;
        Ok(path)
    }

    /// Compare the declared IO with the filesystem and with prior records.
    pub fn check(&self, ctx: &Context) -> Result<CheckOutcome, RelationError> {
        let mut outcome = CheckOutcome::default();
        if self.record.io.is_empty() {
            outcome.observe(Signal::NoIoData, None, None);
            return Ok(outcome);
        }

        for io in &self.record.io {
            let path = Path::new(&io.filename);
            match current_hash(ctx, path)? {
                None => {
                    outcome.observe(Signal::FileNotFound, Some(&io.filename), None);
                    outcome.observe(Signal::not_found(io.category), Some(&io.filename), None);
                }
                Some(current) if io.strong_hash.as_deref() != Some(current.as_str()) => {
                    outcome.observe(Signal::FileChanged, Some(&io.filename), None);
                    outcome.observe(Signal::changed(io.category), Some(&io.filename), None);
                }
                Some(_) => {}
            }
        }

        for other in self.find_in_db(ctx)? {
            if !self.same_io_structure(&other) {
                tracing::warn!(relation = other.id(), "matched record has a different io structure");
                continue;
            }
            if !self.same_input(&other) {
                tracing::warn!(relation = other.id(), "matched record has different input");
                continue;
            }
            let signal = if self.same_output(&other) {
                Signal::FoundMatchingRecord
            } else {
                Signal::FoundMatchingRecordOutputChanged
            };
            outcome.observe(signal, None, Some(other.id()));
        }

        tracing::debug!(relation = self.id(), signals = ?outcome.signals(), "checked");
        Ok(outcome)
    }

    /// Stored relations with the same template fingerprint whose IO contains
    /// every input of this one. Empty when an input has no hash.
    pub fn find_in_db(&self, ctx: &Context) -> Result<Vec<Relation>, RelationError> {
        if self.record.io.is_empty() {
            tracing::warn!(relation = self.id(), "cannot query relations without io");
            return Ok(Vec::new());
        }

        let mut clauses = Vec::new();
        for io in self.inputs() {
            let Some(ref strong_hash) = io.strong_hash else {
                tracing::info!(file = %io.filename, "no input hash, cannot query");
                return Ok(Vec::new());
            };
            clauses.push(IoClause {
                strong_hash: strong_hash.clone(),
                category: io.category.as_str().to_string(),
                group: io.group.clone(),
            });
        }

        let filter = Filter::IoMatch {
            template_fingerprint: self.record.template_fingerprint.clone(),
            clauses,
        };
        let docs = ctx.store().find(Collection::Relation, &filter, None)?;
        Ok(parse_all(&docs))
    }

    fn inputs(&self) -> impl Iterator<Item = &IoEntry> {
        self.record
            .io
            .iter()
            .filter(|io| io.category == IoCategory::Input)
    }

    fn io_structure(&self) -> Vec<(IoCategory, &str)> {
        let mut structure: Vec<_> = self
            .record
            .io
            .iter()
            .map(|io| (io.category, io.group.as_str()))
            .collect();
        structure.sort_unstable();
        structure
    }

    /// Same multiset of `(category, group)` pairs, filenames ignored.
    pub fn same_io_structure(&self, other: &Relation) -> bool {
        self.io_structure() == other.io_structure()
    }

    /// Every input of `other` is present here by group and hash.
    pub fn same_input(&self, other: &Relation) -> bool {
        self.contains_all(other, IoCategory::Input)
    }

    /// Every output of `other` is present here by group and hash.
    pub fn same_output(&self, other: &Relation) -> bool {
        self.contains_all(other, IoCategory::Output)
    }

    fn contains_all(&self, other: &Relation, category: IoCategory) -> bool {
        other
            .record
            .io
            .iter()
            .filter(|io| io.category == category)
            .all(|io| self.contains(io))
    }

    /// An entry with the same category, group and hash exists here.
    pub fn contains(&self, entry: &IoEntry) -> bool {
        self.record.io.iter().any(|io| {
            io.category == entry.category
                && io.group == entry.group
                && io.strong_hash == entry.strong_hash
        })
    }

    /// Re-hash every existing IO file after execution. A drifted input is an
    /// error; outputs take their new hash.
    pub fn refresh_io(&mut self, ctx: &Context) -> Result<(), RelationError> {
        for io in &mut self.record.io {
            let path = PathBuf::from(&io.filename);
            let Some(current) = current_hash(ctx, &path)? else {
                continue;
            };
            match io.category {
                IoCategory::Input => {
                    if io.strong_hash.as_deref() != Some(current.as_str()) {
                        return Err(RelationError::InputChanged {
                            path,
                            declared: io.strong_hash.clone().unwrap_or_else(|| "<absent>".into()),
                            current,
                        });
                    }
                }
                IoCategory::Output => {
                    if io
                        .strong_hash
                        .as_deref()
                        .is_some_and(|declared| declared != current)
                    {
                        tracing::warn!(file = %io.filename, "output hash changed");
                    }
                    io.strong_hash = Some(current);
                }
            }
        }
        Ok(())
    }

    /// Persist the relation, returning its id.
    pub fn save(self, ctx: &Context) -> Result<String, RelationError> {
        let doc = self.record.to_document()?;
        ctx.store()
            .upsert(Collection::Relation, &self.record.id, &doc)?;
        tracing::info!(relation = %self.record.id, state = %self.record.state, "relation saved");
        Ok(self.record.id)
    }

    pub fn load(ctx: &Context, id: &str) -> Result<Option<Relation>, RelationError> {
        ctx.store()
            .find_one(Collection::Relation, id)?
            .map(|doc| RelationRecord::from_document(&doc).map(Self::from_record))
            .transpose()
    }

    /// Stored relations matching `search`. Malformed records are skipped.
    pub fn search(ctx: &Context, search: &RelationSearch) -> Result<Vec<Relation>, RelationError> {
        let docs = ctx
            .store()
            .find(Collection::Relation, &Filter::Relations(search.clone()), None)?;
        Ok(parse_all(&docs))
    }

    /// Stored relations whose IO mentions the current content of `path`.
    pub fn search_involving(
        ctx: &Context,
        path: &Path,
        mut search: RelationSearch,
    ) -> Result<Vec<Relation>, RelationError> {
        let path = paths::absolutize(path).map_err(|e| IdentityError::from_io(path.to_path_buf(), e))?;
        let file = TrackedFile::open(ctx, &path, false, None)?;
        search.involves_hash = Some(file.strong_hash().to_string());
        Self::search(ctx, &search)
    }
}

/// Current strong hash of `path`, `None` when it does not exist.
fn current_hash(ctx: &Context, path: &Path) -> Result<Option<String>, RelationError> {
    if !path.exists() {
        return Ok(None);
    }
    match TrackedFile::open(ctx, path, false, None) {
        Ok(file) => Ok(Some(file.strong_hash().to_string())),
        Err(IdentityError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_all(docs: &[mad_core::types::Document]) -> Vec<Relation> {
    docs.iter()
        .filter_map(|doc| match RelationRecord::from_document(doc) {
            Ok(record) => Some(Relation::from_record(record)),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed relation record");
                None
            }
        })
        .collect()
}
