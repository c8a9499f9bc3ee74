//! Document model shared by the store and the engines.
//!
//! A document is a JSON object whose primary key lives under `_id`. The
//! catalog keeps three collections: `identity` (keyed by transient id),
//! `content` (keyed by strong hash) and `relation` (keyed by random id).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document.
pub type Document = Map<String, Value>;

/// Field carrying a document's primary key.
pub const ID_FIELD: &str = "_id";

/// The three logical collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Identity,
    Content,
    Relation,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::Identity, Self::Content, Self::Relation];

    /// Table / collection name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Content => "content",
            Self::Relation => "relation",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One `(strong_hash, category, group)` match clause of an IO query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IoClause {
    pub strong_hash: String,
    pub category: String,
    pub group: String,
}

/// Relation search criteria; every `Some` field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationSearch {
    pub id_prefix: Option<String>,
    pub hostname: Option<String>,
    pub state: Option<String>,
    /// Content hash that must appear in any IO entry.
    pub involves_hash: Option<String>,
}

/// The query shapes the catalog needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// Identity documents whose `filename` starts with the prefix.
    FilenamePrefix(String),
    /// Relation documents with this template fingerprint (absent matches
    /// absent) whose `io` list satisfies every clause.
    IoMatch {
        template_fingerprint: Option<String>,
        clauses: Vec<IoClause>,
    },
    /// Relation documents matching the search criteria.
    Relations(RelationSearch),
}

impl Filter {
    /// Short label used in error messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::FilenamePrefix(_) => "filename_prefix",
            Self::IoMatch { .. } => "io_match",
            Self::Relations(_) => "relations",
        }
    }
}

/// A buffered set of unordered upserts against one collection.
///
/// Upserts are applied in one transaction when the batch executes; a key
/// queued twice ends with the last write.
#[derive(Debug, Clone)]
pub struct WriteBatch {
    collection: Collection,
    ops: Vec<(String, Document)>,
}

impl WriteBatch {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            ops: Vec::new(),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Queue an upsert-by-id.
    pub fn upsert(&mut self, id: impl Into<String>, doc: Document) {
        self.ops.push((id.into(), doc));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drain the queued operations, leaving the batch empty.
    pub fn take_ops(&mut self) -> Vec<(String, Document)> {
        std::mem::take(&mut self.ops)
    }

    pub fn ops(&self) -> &[(String, Document)] {
        &self.ops
    }
}

/// Keep `_id` plus the listed keys.
pub fn project(doc: Document, fields: &[&str]) -> Document {
    doc.into_iter()
        .filter(|(k, _)| k == ID_FIELD || fields.contains(&k.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn projection_keeps_id() {
        let doc = json!({"_id": "a", "filename": "/x", "size": 3, "owner_name": "u"});
        let Value::Object(doc) = doc else { unreachable!() };
        let projected = project(doc, &["filename", "size"]);
        assert_eq!(projected.len(), 3);
        assert!(projected.contains_key("_id"));
        assert!(!projected.contains_key("owner_name"));
    }

    #[test]
    fn batch_take_ops_empties() {
        let mut batch = WriteBatch::new(Collection::Identity);
        batch.upsert("a", Document::new());
        batch.upsert("a", Document::new());
        assert_eq!(batch.len(), 2);
        let ops = batch.take_ops();
        assert_eq!(ops.len(), 2);
        assert!(batch.is_empty());
    }
}
