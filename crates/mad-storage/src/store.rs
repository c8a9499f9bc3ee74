//! SqliteStore: the SQLite-backed `DocumentStore`.

use std::path::Path;
use std::time::Instant;

use mad_core::errors::StorageError;
use mad_core::tracing::metrics;
use mad_core::traits::DocumentStore;
use mad_core::types::document::project;
use mad_core::types::{Collection, Document, Filter, WriteBatch};

use crate::connection::writer::with_immediate_transaction;
use crate::connection::DatabaseManager;
use crate::queries::{documents, identity, relations};

/// Document store over a single SQLite database.
pub struct SqliteStore {
    db: DatabaseManager,
}

impl SqliteStore {
    /// Open (creating if needed) a file-backed store.
    pub fn open(path: &Path, read_pool_size: usize) -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open(path, read_pool_size)?,
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open_in_memory()?,
        })
    }

    /// Access the underlying connection manager.
    pub fn manager(&self) -> &DatabaseManager {
        &self.db
    }

    /// Count documents in a collection.
    pub fn count(&self, collection: Collection) -> Result<i64, StorageError> {
        self.db.with_reader(|conn| documents::count(conn, collection))
    }
}

impl DocumentStore for SqliteStore {
    fn find_one(&self, collection: Collection, id: &str) -> Result<Option<Document>, StorageError> {
        self.db
            .with_reader(|conn| documents::find_one(conn, collection, id))
    }

    fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: Option<&[&str]>,
    ) -> Result<Vec<Document>, StorageError> {
        let docs = self.db.with_reader(|conn| match (collection, filter) {
            (_, Filter::All) => documents::find_all(conn, collection),
            (Collection::Identity, Filter::FilenamePrefix(prefix)) => {
                identity::find_by_filename_prefix(conn, prefix)
            }
            (
                Collection::Relation,
                Filter::IoMatch {
                    template_fingerprint,
                    clauses,
                },
            ) => relations::find_by_io_match(conn, template_fingerprint.as_deref(), clauses),
            (Collection::Relation, Filter::Relations(search)) => relations::search(conn, search),
            _ => Err(StorageError::UnsupportedFilter {
                collection: collection.name().to_string(),
                filter: filter.label().to_string(),
            }),
        })?;

        Ok(match projection {
            Some(fields) => docs.into_iter().map(|d| project(d, fields)).collect(),
            None => docs,
        })
    }

    fn upsert(&self, collection: Collection, id: &str, doc: &Document) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| documents::upsert(conn, collection, id, doc))
    }

    fn batch_execute(&self, mut batch: WriteBatch) -> Result<usize, StorageError> {
        let collection = batch.collection();
        let ops = batch.take_ops();
        if ops.is_empty() {
            return Ok(0);
        }

        let start = Instant::now();
        let written = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                for (id, doc) in &ops {
                    documents::upsert(tx, collection, id, doc)?;
                }
                Ok(ops.len())
            })
        })?;
        metrics::record(metrics::BATCH_WRITE_TIME, start.elapsed().as_millis() as u64);
        tracing::debug!(collection = collection.name(), written, "batch executed");
        Ok(written)
    }

    fn delete_many(&self, collection: Collection, ids: &[String]) -> Result<usize, StorageError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| documents::delete_many(tx, collection, ids))
        })
    }
}
