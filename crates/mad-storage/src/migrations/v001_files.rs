//! V001: file catalog collections.
//! identity (one row per host + absolute path), content (one row per strong hash).

pub const MIGRATION_SQL: &str = r#"
-- Identity documents. `filename` is extracted for prefix scans.
CREATE TABLE IF NOT EXISTS identity (
    id TEXT PRIMARY KEY,
    doc TEXT NOT NULL,
    filename TEXT GENERATED ALWAYS AS (json_extract(doc, '$.filename')) VIRTUAL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_identity_filename
    ON identity(filename);

-- Content documents, keyed by strong hash. Accumulate-only.
CREATE TABLE IF NOT EXISTS content (
    id TEXT PRIMARY KEY,
    doc TEXT NOT NULL
) STRICT;
"#;
