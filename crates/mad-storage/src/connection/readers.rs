//! Read-only connections for catalog lookups.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};

use mad_core::errors::StorageError;
use rusqlite::{Connection, OpenFlags};

use super::settings::{configure, Role};

/// `store.read_pool_size` read-only connections to the catalog file.
///
/// Scanner workers look up identity records concurrently; a caller takes
/// the first idle connection and only blocks when all of them are busy.
pub struct Readers {
    slots: Vec<Mutex<Connection>>,
    start: AtomicUsize,
}

impl Readers {
    pub fn open(path: &Path, count: usize) -> Result<Self, StorageError> {
        let slots = (0..count.max(1))
            .map(|_| {
                let conn = Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(|e| StorageError::SqliteError {
                    message: format!("open reader on {}: {e}", path.display()),
                })?;
                configure(&conn, Role::Reader)?;
                Ok(Mutex::new(conn))
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        tracing::debug!(path = %path.display(), readers = slots.len(), "opened catalog readers");
        Ok(Self {
            slots,
            start: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.acquire()?;
        f(&guard)
    }

    fn acquire(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        let first = self.start.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let poisoned = || StorageError::SqliteError {
            message: "catalog reader poisoned".to_string(),
        };
        for offset in 0..self.slots.len() {
            match self.slots[(first + offset) % self.slots.len()].try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(_)) => return Err(poisoned()),
            }
        }
        self.slots[first].lock().map_err(|_| poisoned())
    }
}
