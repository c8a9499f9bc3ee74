//! Relation collection queries.

use mad_core::errors::StorageError;
use mad_core::types::{Collection, Document, IoClause, RelationSearch};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use super::documents::collect_docs;

/// Relations sharing `template_fingerprint` (NULL matches NULL) whose `io`
/// list contains an entry matching every clause.
pub fn find_by_io_match(
    conn: &Connection,
    template_fingerprint: Option<&str>,
    clauses: &[IoClause],
) -> Result<Vec<Document>, StorageError> {
    let mut sql = String::from("SELECT id, doc FROM relation WHERE template_fingerprint IS ?1");
    let mut values: Vec<SqlValue> = vec![template_fingerprint
        .map(|fp| SqlValue::Text(fp.to_string()))
        .unwrap_or(SqlValue::Null)];

    for clause in clauses {
        let base = values.len();
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM json_each(relation.doc, '$.io') AS io
               WHERE json_extract(io.value, '$.strong_hash') = ?{}
                 AND json_extract(io.value, '$.category') = ?{}
                 AND json_extract(io.value, '$.group') = ?{})",
            base + 1,
            base + 2,
            base + 3
        ));
        values.push(SqlValue::Text(clause.strong_hash.clone()));
        values.push(SqlValue::Text(clause.category.clone()));
        values.push(SqlValue::Text(clause.group.clone()));
    }
    sql.push_str(" ORDER BY json_extract(doc, '$.time'), id");

    collect_docs(conn, Collection::Relation, &sql, params_from_iter(values))
}

/// Relations matching every `Some` criterion of `search`.
pub fn search(conn: &Connection, search: &RelationSearch) -> Result<Vec<Document>, StorageError> {
    let mut sql = String::from("SELECT id, doc FROM relation WHERE 1 = 1");
    let mut values: Vec<SqlValue> = Vec::new();

    if let Some(ref prefix) = search.id_prefix {
        values.push(SqlValue::Text(prefix.clone()));
        let n = values.len();
        sql.push_str(&format!(" AND substr(id, 1, length(?{n})) = ?{n}"));
    }
    if let Some(ref hostname) = search.hostname {
        values.push(SqlValue::Text(hostname.clone()));
        sql.push_str(&format!(" AND hostname = ?{}", values.len()));
    }
    if let Some(ref state) = search.state {
        values.push(SqlValue::Text(state.clone()));
        sql.push_str(&format!(" AND state = ?{}", values.len()));
    }
    if let Some(ref hash) = search.involves_hash {
        values.push(SqlValue::Text(hash.clone()));
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM json_each(relation.doc, '$.io') AS io
               WHERE json_extract(io.value, '$.strong_hash') = ?{})",
            values.len()
        ));
    }
    sql.push_str(" ORDER BY json_extract(doc, '$.time'), id");

    collect_docs(conn, Collection::Relation, &sql, params_from_iter(values))
}
