//! Write batching for bulk operations.

use std::sync::Mutex;

use mad_core::errors::StorageError;
use mad_core::traits::DocumentStore;
use mad_core::types::{Collection, Document, WriteBatch};

/// One unordered batch per file collection, filled concurrently by scan
/// workers and flushed once.
///
/// Passed explicitly into the identity engine's save path; a save without a
/// session writes straight through.
pub struct BatchSession {
    identity: Mutex<WriteBatch>,
    content: Mutex<WriteBatch>,
}

/// Documents written by [`BatchSession::execute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub identity_written: usize,
    pub content_written: usize,
}

impl BatchSession {
    pub fn begin(store: &dyn DocumentStore) -> Self {
        Self {
            identity: Mutex::new(store.batch_begin(Collection::Identity)),
            content: Mutex::new(store.batch_begin(Collection::Content)),
        }
    }

    /// Queue an upsert. Only the file collections are batched.
    pub fn enqueue(&self, collection: Collection, id: impl Into<String>, doc: Document) {
        let slot = match collection {
            Collection::Content => &self.content,
            _ => &self.identity,
        };
        slot.lock().unwrap_or_else(|e| e.into_inner()).upsert(id, doc);
    }

    /// Queued operations as `(identity, content)`.
    pub fn pending(&self) -> (usize, usize) {
        (
            self.identity.lock().unwrap_or_else(|e| e.into_inner()).len(),
            self.content.lock().unwrap_or_else(|e| e.into_inner()).len(),
        )
    }

    /// Flush both batches. Empty batches are logged and skipped.
    pub fn execute(self, store: &dyn DocumentStore) -> Result<BatchOutcome, StorageError> {
        let identity = self.identity.into_inner().unwrap_or_else(|e| e.into_inner());
        let content = self.content.into_inner().unwrap_or_else(|e| e.into_inner());
        Ok(BatchOutcome {
            identity_written: flush(store, identity)?,
            content_written: flush(store, content)?,
        })
    }
}

fn flush(store: &dyn DocumentStore, batch: WriteBatch) -> Result<usize, StorageError> {
    let collection = batch.collection();
    if batch.is_empty() {
        tracing::info!(%collection, "no bulk operations to execute");
        return Ok(0);
    }
    let written = store.batch_execute(batch)?;
    tracing::debug!(%collection, written, "bulk write executed");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mad_storage::SqliteStore;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_session_executes_cleanly() {
        let store = SqliteStore::open_in_memory().unwrap();
        let session = BatchSession::begin(&store);
        assert_eq!(session.execute(&store).unwrap(), BatchOutcome::default());
    }

    #[test]
    fn routes_by_collection() {
        let store = SqliteStore::open_in_memory().unwrap();
        let session = BatchSession::begin(&store);
        session.enqueue(Collection::Identity, "a", doc(json!({"x": 1})));
        session.enqueue(Collection::Identity, "b", doc(json!({"x": 2})));
        session.enqueue(Collection::Content, "h", doc(json!({"y": 3})));
        assert_eq!(session.pending(), (2, 1));

        let outcome = session.execute(&store).unwrap();
        assert_eq!(outcome.identity_written, 2);
        assert_eq!(outcome.content_written, 1);
        assert!(store.find_one(Collection::Content, "h").unwrap().is_some());
    }
}
