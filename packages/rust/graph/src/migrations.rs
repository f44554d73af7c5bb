//! SQL migration definitions for the local paper-graph database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed as one batch.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: papers, relations",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Paper nodes. Embeddings are JSON arrays of a fixed dimensionality
-- enforced at the store layer.
CREATE TABLE IF NOT EXISTS papers (
    id                TEXT PRIMARY KEY,
    title             TEXT NOT NULL,
    year              INTEGER NOT NULL,
    venue             TEXT NOT NULL,
    paper_type        TEXT NOT NULL,
    problem_statement TEXT NOT NULL,
    core_method       TEXT NOT NULL,
    key_findings      TEXT NOT NULL,
    embedding_problem TEXT NOT NULL,
    embedding_method  TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

-- Semantic relation edges. One edge per (source, target, provenance);
-- the label is free text so the taxonomy can grow without a migration.
CREATE TABLE IF NOT EXISTS relations (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id  TEXT NOT NULL REFERENCES papers(id),
    target_id  TEXT NOT NULL REFERENCES papers(id),
    label      TEXT NOT NULL,
    confidence REAL NOT NULL,
    reasoning  TEXT NOT NULL,
    provenance TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(source_id, target_id, provenance)
);

CREATE INDEX IF NOT EXISTS idx_relations_source ON relations(source_id);
CREATE INDEX IF NOT EXISTS idx_relations_target ON relations(target_id);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
