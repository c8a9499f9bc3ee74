//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, MadErrorCode};
use super::{IdentityError, StorageError};

/// Errors that abort a scan. Per-file failures are counted, not raised.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan root is not a directory: {path}")]
    RootNotDirectory { path: PathBuf },

    #[error("IO error scanning {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid ignore pattern {pattern:?}: {message}")]
    IgnorePattern { pattern: String, message: String },

    #[error("Failed to build worker pool: {message}")]
    WorkerPool { message: String },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl MadErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Identity(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            _ => error_code::SCAN_ERROR,
        }
    }
}
