//! Storage-layer errors.

use super::error_code::{self, MadErrorCode};

/// Errors raised by a `DocumentStore` implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("write to {collection} failed: {message}")]
    WriteFailed { collection: String, message: String },

    #[error("malformed document {id} in {collection}: {message}")]
    MalformedDocument {
        collection: String,
        id: String,
        message: String,
    },

    #[error("filter {filter} is not supported on {collection}")]
    UnsupportedFilter { collection: String, filter: String },

    #[error("serialization failed: {message}")]
    Serialization { message: String },
}

impl MadErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WriteFailed { .. } => error_code::STORE_WRITE_ERROR,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
