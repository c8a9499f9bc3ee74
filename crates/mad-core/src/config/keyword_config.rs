//! Keyword definitions as they appear in `[keywords.<name>]` tables.

use serde::{Deserialize, Serialize};

use crate::keywords::{Category, Shape, ValueType};

/// One keyword definition. Absent fields take the schema defaults:
/// shape `one`, categories `{transient, core}`, type `str`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Resolve to another keyword instead.
    pub alias: Option<String>,
    pub shape: Option<Shape>,
    pub cat: Option<Vec<Category>>,
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,
    pub help: Option<String>,
}
