//! V002: provenance relations.

pub const MIGRATION_SQL: &str = r#"
-- Relation documents. Immutable once written; a re-run writes a new row.
CREATE TABLE IF NOT EXISTS relation (
    id TEXT PRIMARY KEY,
    doc TEXT NOT NULL,
    template_fingerprint TEXT GENERATED ALWAYS AS (json_extract(doc, '$.template_fingerprint')) VIRTUAL,
    hostname TEXT GENERATED ALWAYS AS (json_extract(doc, '$.hostname')) VIRTUAL,
    state TEXT GENERATED ALWAYS AS (json_extract(doc, '$.state')) VIRTUAL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_relation_template
    ON relation(template_fingerprint);
CREATE INDEX IF NOT EXISTS idx_relation_host_state
    ON relation(hostname, state);
"#;
