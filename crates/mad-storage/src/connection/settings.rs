//! Per-role SQLite settings for the catalog database.
//!
//! The catalog is one file that scanners on several hosts may share, so
//! writers wait a long time for the lock rather than fail a batch flush.
//! Rows are small JSON documents; the page cache stays modest and there
//! are no foreign keys to enforce.

use mad_core::errors::StorageError;
use rusqlite::Connection;

/// Lock wait for both roles. A batch flush of a large scan can hold the
/// write lock for several seconds.
pub const LOCK_WAIT_MS: u32 = 30_000;

/// Which side of the store a connection serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The single connection that runs upserts, deletes and migrations.
    Writer,
    /// A `query_only` connection used for lookups and searches.
    Reader,
}

impl Role {
    fn statements(self) -> String {
        match self {
            // WAL lets readers keep serving lookups while a scan flushes.
            Role::Writer => format!(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA cache_size = -16000;
                 PRAGMA busy_timeout = {LOCK_WAIT_MS};"
            ),
            Role::Reader => format!(
                "PRAGMA query_only = ON;
                 PRAGMA cache_size = -8000;
                 PRAGMA busy_timeout = {LOCK_WAIT_MS};"
            ),
        }
    }
}

/// Configure `conn` for `role`.
pub fn configure(conn: &Connection, role: Role) -> Result<(), StorageError> {
    conn.execute_batch(&role.statements())
        .map_err(|e| StorageError::SqliteError {
            message: format!("configure {role:?} connection: {e}"),
        })
}

/// The journal mode in effect, lower-cased (`"wal"`, `"memory"`, ...).
pub fn journal_mode(conn: &Connection) -> Result<String, StorageError> {
    conn.pragma_query_value(None, "journal_mode", |row| row.get::<_, String>(0))
        .map(|mode| mode.to_ascii_lowercase())
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}
