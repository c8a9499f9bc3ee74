//! Keyword schema: resolves raw metadata keys to a canonical key, a value
//! type, a shape and a category set.

pub mod schema;
pub mod value;

pub use schema::{CategorySet, KeywordSchema, ResolvedKey};
pub use value::apply_value;

use serde::{Deserialize, Serialize};

/// How repeated assignments to a key combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Shape {
    /// Replace the stored value.
    #[default]
    #[serde(rename = "one")]
    Scalar,
    /// Append to a deduplicated list.
    #[serde(rename = "set")]
    AppendSet,
}

/// Which record a keyword is stored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The per-(host, path) identity record.
    Transient,
    /// The content record shared by identical files.
    Core,
}

/// Conversion applied to raw string input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Str,
    Int,
    Float,
}
