//! Catalog connections: one serialized writer plus read-only readers.

pub mod readers;
pub mod settings;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use mad_core::errors::StorageError;
use rusqlite::Connection;

use self::readers::Readers;
use self::settings::{configure, Role};
use crate::migrations;

/// The catalog's writer and its readers.
///
/// In-memory databases have no readers: a second in-memory connection
/// is a separate database, so reads go through the writer.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: Option<Readers>,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open the catalog at `path`, creating parent directories, then
    /// migrate it and open `read_pool_size` readers.
    pub fn open(path: &Path, read_pool_size: usize) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::SqliteError {
                    message: format!("create {}: {e}", parent.display()),
                })?;
            }
        }
        let writer = Connection::open(path).map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
        configure(&writer, Role::Writer)?;
        migrations::run_migrations(&writer)?;

        let readers = Readers::open(path, read_pool_size)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Some(readers),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
        configure(&writer, Role::Writer)?;
        migrations::run_migrations(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: None,
            path: None,
        })
    }

    /// Execute a write operation with the serialized writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.writer.lock().map_err(|_| StorageError::SqliteError {
            message: "write lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Execute a read operation on an idle reader, or on the writer for
    /// in-memory databases.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        match self.readers {
            Some(ref readers) => readers.with_conn(f),
            None => self.with_writer(f),
        }
    }

    /// Number of readers; zero for in-memory databases.
    pub fn reader_count(&self) -> usize {
        self.readers.as_ref().map_or(0, Readers::len)
    }

    /// Run a WAL checkpoint (TRUNCATE mode) after scan completion.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        if self.path.is_none() {
            return Ok(());
        }
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })
        })
    }
}
