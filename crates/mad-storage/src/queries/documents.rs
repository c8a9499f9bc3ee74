//! Collection-agnostic document CRUD.

use mad_core::errors::StorageError;
use mad_core::types::{Collection, Document, ID_FIELD};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::to_storage_err;

/// Decode a stored document.
pub(crate) fn parse_doc(collection: Collection, id: &str, text: &str) -> Result<Document, StorageError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(doc)) => Ok(doc),
        Ok(other) => Err(StorageError::MalformedDocument {
            collection: collection.name().to_string(),
            id: id.to_string(),
            message: format!("expected an object, found {other}"),
        }),
        Err(e) => Err(StorageError::MalformedDocument {
            collection: collection.name().to_string(),
            id: id.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Run a `SELECT id, doc ...` statement and decode every row.
pub(crate) fn collect_docs<P: rusqlite::Params>(
    conn: &Connection,
    collection: Collection,
    sql: &str,
    params: P,
) -> Result<Vec<Document>, StorageError> {
    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        let (id, text) = row.map_err(|e| to_storage_err(e.to_string()))?;
        result.push(parse_doc(collection, &id, &text)?);
    }
    Ok(result)
}

/// Point lookup by id.
pub fn find_one(
    conn: &Connection,
    collection: Collection,
    id: &str,
) -> Result<Option<Document>, StorageError> {
    let sql = format!("SELECT doc FROM {} WHERE id = ?1", collection.name());
    let text: Option<String> = conn
        .prepare_cached(&sql)
        .and_then(|mut stmt| stmt.query_row(params![id], |row| row.get(0)).optional())
        .map_err(|e| to_storage_err(e.to_string()))?;
    text.map(|t| parse_doc(collection, id, &t)).transpose()
}

/// Every document in a collection, ordered by id.
pub fn find_all(conn: &Connection, collection: Collection) -> Result<Vec<Document>, StorageError> {
    let sql = format!("SELECT id, doc FROM {} ORDER BY id", collection.name());
    collect_docs(conn, collection, &sql, [])
}

/// Upsert with `$set` semantics: top-level keys of `doc` replace stored
/// keys, the rest of the stored document survives.
pub fn upsert(
    conn: &Connection,
    collection: Collection,
    id: &str,
    doc: &Document,
) -> Result<(), StorageError> {
    let mut doc = doc.clone();
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    let text = serde_json::to_string(&doc).map_err(|e| StorageError::Serialization {
        message: e.to_string(),
    })?;
    let table = collection.name();
    let sql = format!(
        "INSERT INTO {table} (id, doc) VALUES (?1, json(?2))
         ON CONFLICT(id) DO UPDATE SET doc = json_patch({table}.doc, excluded.doc)"
    );
    conn.prepare_cached(&sql)
        .and_then(|mut stmt| stmt.execute(params![id, text]))
        .map_err(|e| StorageError::WriteFailed {
            collection: table.to_string(),
            message: e.to_string(),
        })?;
    Ok(())
}

/// Delete every listed id; returns the number of rows removed.
pub fn delete_many(
    conn: &Connection,
    collection: Collection,
    ids: &[String],
) -> Result<usize, StorageError> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", collection.name());
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut removed = 0;
    for id in ids {
        removed += stmt
            .execute(params![id])
            .map_err(|e| StorageError::WriteFailed {
                collection: collection.name().to_string(),
                message: e.to_string(),
            })?;
    }
    Ok(removed)
}

/// Count documents in a collection.
pub fn count(conn: &Connection, collection: Collection) -> Result<i64, StorageError> {
    let sql = format!("SELECT COUNT(*) FROM {}", collection.name());
    conn.query_row(&sql, [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}
