//! Relation record types as stored in the `relation` collection.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mad_core::errors::RelationError;
use mad_core::types::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Group used for executables registered through `add_executable`.
pub const EXECUTABLE_GROUP: &str = "executable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoCategory {
    Input,
    Output,
}

impl IoCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            IoCategory::Input => "input",
            IoCategory::Output => "output",
        }
    }
}

impl fmt::Display for IoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state. Transitions are not policed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationState {
    #[default]
    Pending,
    Running,
    Finished,
}

impl RelationState {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationState::Pending => "pending",
            RelationState::Running => "running",
            RelationState::Finished => "finished",
        }
    }
}

impl fmt::Display for RelationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RelationState::Pending),
            "running" => Ok(RelationState::Running),
            "finished" => Ok(RelationState::Finished),
            other => Err(format!("unknown relation state: {other}")),
        }
    }
}

/// One declared input or output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoEntry {
    pub category: IoCategory,
    pub group: String,
    pub filename: String,
    /// Present only when the file existed at declaration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strong_hash: Option<String>,
}

/// The persisted form of a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub time: DateTime<Utc>,
    pub working_directory: String,
    pub hostname: String,
    #[serde(default)]
    pub state: RelationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_fingerprint: Option<String>,
    #[serde(default)]
    pub io: Vec<IoEntry>,
}

impl RelationRecord {
    pub fn to_document(&self) -> Result<Document, RelationError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(self.malformed("not an object".to_string())),
            Err(e) => Err(self.malformed(e.to_string())),
        }
    }

    pub fn from_document(doc: &Document) -> Result<Self, RelationError> {
        serde_json::from_value(Value::Object(doc.clone())).map_err(|e| RelationError::Malformed {
            id: doc
                .get(mad_core::types::ID_FIELD)
                .and_then(Value::as_str)
                .unwrap_or("<no id>")
                .to_string(),
            message: e.to_string(),
        })
    }

    fn malformed(&self, message: String) -> RelationError {
        RelationError::Malformed {
            id: self.id.clone(),
            message,
        }
    }
}
