//! Relation engine errors.

use std::path::PathBuf;

use super::error_code::{self, MadErrorCode};
use super::{IdentityError, StorageError};

/// Errors raised while declaring, checking or refreshing a relation.
#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    /// An input drifted between declaration and execution.
    #[error("Input file changed {path}: declared {declared}, now {current}")]
    InputChanged {
        path: PathBuf,
        declared: String,
        current: String,
    },

    #[error("Executable not found on PATH: {name}")]
    ExecutableNotFound { name: String },

    #[error("Cannot determine working directory: {source}")]
    WorkingDirectory { source: std::io::Error },

    #[error("Malformed relation record {id}: {message}")]
    Malformed { id: String, message: String },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl MadErrorCode for RelationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InputChanged { .. } => error_code::INPUT_CHANGED,
            Self::Identity(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            _ => error_code::RELATION_ERROR,
        }
    }
}
