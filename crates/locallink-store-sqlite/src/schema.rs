//! SQL schema for the locallink SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document. The JSON body is authoritative; the other columns
-- are copies of body fields used for ordering and soft-delete filtering.
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT NOT NULL,   -- 'profile' | 'object' | 'activity' | 'board' | 'group'
    id          TEXT NOT NULL,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond precision
    deleted_at  TEXT,
    body_json   TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS documents_order_idx
    ON documents(collection, created_at DESC, id DESC);

PRAGMA user_version = 1;
";
