//! Identity engine errors.

use std::path::PathBuf;

use super::error_code::{self, MadErrorCode};
use super::{KeywordError, StorageError};

/// Errors that can occur while building or mutating a file's identity record.
///
/// `NotFound` and `PermissionDenied` are fatal to a single-file operation
/// but a scan skips and counts them.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Cannot generate checksum for {path}: {source}")]
    HashingIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("on_load hook failed for {path}: {message}")]
    Hook { path: PathBuf, message: String },

    #[error(transparent)]
    Keyword(#[from] KeywordError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IdentityError {
    /// Build an error from an I/O failure encountered before hashing starts.
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Stat { path, source },
        }
    }

    /// True for the conditions a scan absorbs with a counter increment.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::PermissionDenied { .. } | Self::HashingIo { .. }
        )
    }
}

impl MadErrorCode for IdentityError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::PermissionDenied { .. } => error_code::PERMISSION_DENIED,
            Self::HashingIo { .. } => error_code::HASHING_IO_ERROR,
            Self::Stat { .. } => error_code::STAT_ERROR,
            Self::Hook { .. } => error_code::HOOK_ERROR,
            Self::Keyword(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
        }
    }
}
