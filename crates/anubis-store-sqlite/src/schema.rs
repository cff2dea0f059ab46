//! SQL schema for the Anubis SQLite store.
//!
//! Executed on every connection open; idempotent thanks to
//! `CREATE … IF NOT EXISTS`.

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS submissions (
    submission_id TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    body          TEXT NOT NULL,
    created_utc   REAL NOT NULL,   -- seconds since the Unix epoch, UTC
    verdict       TEXT,            -- community verdict symbol, e.g. 'NTA'
    local_verdict TEXT             -- verdict assigned by a local model
);

-- Backfill and training both select on the community verdict.
CREATE INDEX IF NOT EXISTS submissions_verdict_idx ON submissions(verdict);

PRAGMA user_version = 1;
";
