//! Identity collection queries.

use mad_core::errors::StorageError;
use mad_core::types::{Collection, Document};
use rusqlite::{params, Connection};

use super::documents::collect_docs;

/// Identity documents whose `filename` starts with `prefix`.
///
/// The range predicate lets SQLite seek on the filename index; the
/// `substr` predicate does the exact prefix test.
pub fn find_by_filename_prefix(
    conn: &Connection,
    prefix: &str,
) -> Result<Vec<Document>, StorageError> {
    collect_docs(
        conn,
        Collection::Identity,
        "SELECT id, doc FROM identity
         WHERE filename >= ?1 AND substr(filename, 1, length(?1)) = ?1
         ORDER BY filename",
        params![prefix],
    )
}
