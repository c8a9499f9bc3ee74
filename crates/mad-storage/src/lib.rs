//! # mad-storage
//!
//! SQLite persistence for the mad catalog. Each collection is a table of
//! JSON documents; indexed fields are generated columns extracted from the
//! document. `SqliteStore` implements `mad_core::traits::DocumentStore`.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod store;

pub use connection::DatabaseManager;
pub use store::SqliteStore;

use mad_core::errors::StorageError;

pub(crate) fn to_storage_err(message: impl Into<String>) -> StorageError {
    StorageError::SqliteError {
        message: message.into(),
    }
}
