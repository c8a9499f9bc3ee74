//! Shared data structures: collection re-exports and the document model.

pub mod collections;
pub mod document;

pub use collections::{FxHashMap, FxHashSet};
pub use document::{
    Collection, Document, Filter, IoClause, RelationSearch, WriteBatch, ID_FIELD,
};
