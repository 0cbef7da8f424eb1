//! SQLite schema definition

/// SQL schema for the topic store
pub const SCHEMA_SQL: &str = r#"
-- Topics: one row per partition, created on first ingestion
CREATE TABLE IF NOT EXISTS topics (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

-- Records: canonical items, deduplicated by exact URL within a topic
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    topic TEXT NOT NULL REFERENCES topics(name),
    source TEXT NOT NULL,
    headline TEXT NOT NULL,
    url TEXT NOT NULL,
    published_date TEXT NOT NULL,
    ingested_at TEXT NOT NULL,
    UNIQUE(topic, url)
);

-- Ingestion runs: one row per committed run
CREATE TABLE IF NOT EXISTS ingestion_runs (
    id TEXT PRIMARY KEY,
    topic TEXT NOT NULL REFERENCES topics(name),
    started_at TEXT NOT NULL,
    completed_at TEXT NOT NULL,
    inserted INTEGER NOT NULL DEFAULT 0,
    skipped_duplicate INTEGER NOT NULL DEFAULT 0,
    malformed INTEGER NOT NULL DEFAULT 0,
    source_failures_json TEXT
);

CREATE INDEX IF NOT EXISTS idx_records_topic_source ON records(topic, source);
CREATE INDEX IF NOT EXISTS idx_runs_topic ON ingestion_runs(topic);
"#;
