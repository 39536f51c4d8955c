//! SQL schema for the Spindle SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Records are append-only from the subsystem's point of view; the only
-- in-place write is the id-keyed upsert the store contract mandates
-- (duplicate id overwrites silently, last write wins).
CREATE TABLE IF NOT EXISTS records (
    record_id TEXT PRIMARY KEY,     -- '{doc_id}_v{version}_{stage}'
    doc_id    TEXT NOT NULL,
    version   INTEGER NOT NULL,
    stage     TEXT NOT NULL,
    document  TEXT NOT NULL,        -- full stage text
    timestamp TEXT NOT NULL,        -- ISO 8601 UTC; recorder-assigned
    is_final  INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS records_doc_idx   ON records(doc_id);
CREATE INDEX IF NOT EXISTS records_final_idx ON records(doc_id, is_final);

PRAGMA user_version = 1;
";
