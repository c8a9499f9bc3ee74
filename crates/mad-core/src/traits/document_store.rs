//! The store interface consumed by the identity, scan and relation engines.

use crate::errors::StorageError;
use crate::types::{Collection, Document, Filter, WriteBatch};

/// A document store exposing the `identity`, `content` and `relation`
/// collections.
///
/// Implementations must be safe to share across scan workers. Per-document
/// upserts are assumed atomic; concurrent writers to the same id end with
/// the last write.
pub trait DocumentStore: Send + Sync {
    /// Point lookup by primary key.
    fn find_one(&self, collection: Collection, id: &str) -> Result<Option<Document>, StorageError>;

    /// Filtered query. `projection`, when given, keeps `_id` plus the listed keys.
    fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: Option<&[&str]>,
    ) -> Result<Vec<Document>, StorageError>;

    /// Immediate single-document upsert. Top-level keys of `doc` replace the
    /// stored ones; other stored keys are kept.
    fn upsert(&self, collection: Collection, id: &str, doc: &Document) -> Result<(), StorageError>;

    /// Open an empty unordered write batch.
    fn batch_begin(&self, collection: Collection) -> WriteBatch {
        WriteBatch::new(collection)
    }

    /// Run every queued upsert. An empty batch is not an error and returns
    /// `Ok(0)`; any other write failure is returned.
    fn batch_execute(&self, batch: WriteBatch) -> Result<usize, StorageError>;

    /// Delete every listed id, returning how many documents were removed.
    fn delete_many(&self, collection: Collection, ids: &[String]) -> Result<usize, StorageError>;
}
