//! Topic store backed by SQLite
//!
//! This module handles all persistence:
//! - Topics (one partition per search topic)
//! - Records (canonical items, unique by URL within a topic)
//! - Ingestion runs (history and stats)
//!
//! Writes go through a [`TopicBatch`], which wraps one transaction so an
//! ingestion run becomes visible all at once or not at all.

mod schema;

pub use schema::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{CanonicalRecord, SourceKind, Topic};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, Transaction};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// A record as read back from the store
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    pub topic: String,
    pub source: String,
    pub headline: String,
    pub url: String,
    pub published_date: String,
    pub ingested_at: String,
}

impl StoredRecord {
    /// The source as a known kind, if it is one
    pub fn kind(&self) -> Option<SourceKind> {
        self.source.parse().ok()
    }
}

/// An ingestion run record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct IngestionRun {
    pub id: String,
    pub topic: String,
    pub started_at: String,
    pub completed_at: String,
    pub inserted: i64,
    pub skipped_duplicate: i64,
    pub malformed: i64,
    pub source_failures_json: Option<String>,
}

impl IngestionRun {
    pub fn new(topic: &Topic, started_at: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            topic: topic.key().to_string(),
            started_at,
            completed_at: Utc::now().to_rfc3339(),
            inserted: 0,
            skipped_duplicate: 0,
            malformed: 0,
            source_failures_json: None,
        }
    }

    pub fn source_failures(&self) -> Vec<String> {
        self.source_failures_json
            .as_ref()
            .and_then(|j| serde_json::from_str(j).ok())
            .unwrap_or_default()
    }
}

/// Partition summary for listings
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TopicSummary {
    pub name: String,
    pub created_at: String,
    pub record_count: i64,
}

/// Per-topic, per-source row count
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SourceCount {
    pub topic: String,
    pub source: String,
    pub count: i64,
}

/// Global statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub topic_count: usize,
    pub record_count: usize,
    pub run_count: usize,
}

/// Topic store handle
#[derive(Clone)]
pub struct TopicStore {
    pool: SqlitePool,
}

impl TopicStore {
    /// Open the store configured for this installation
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::open(&config.paths.db_file).await
    }

    /// Open (creating if needed) the store at `db_path`.
    ///
    /// Any failure here is `StoreUnavailable`.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| store_unavailable(db_path, e))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| store_unavailable(db_path, e))?;

        let store = Self { pool };
        store.init_schema().await.map_err(|e| store_unavailable(db_path, e))?;
        Ok(store)
    }

    /// Initialize the database schema
    async fn init_schema(&self) -> Result<()> {
        debug!("Ensuring database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Start a write batch for one topic
    pub async fn begin(&self, topic: &Topic) -> Result<TopicBatch> {
        let tx = self.pool.begin().await?;
        Ok(TopicBatch {
            tx,
            topic: topic.clone(),
            inserted: 0,
        })
    }

    /// Create the topic's partition if it does not exist yet
    pub async fn ensure_partition(&self, topic: &Topic) -> Result<()> {
        let mut batch = self.begin(topic).await?;
        batch.ensure_partition().await?;
        batch.commit().await
    }

    /// Whether `url` is already stored under `topic`
    pub async fn exists(&self, topic: &Topic, url: &str) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM records WHERE topic = ? AND url = ? LIMIT 1")
                .bind(topic.key())
                .bind(url)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    /// Insert a single record unless its URL is already stored, committing
    /// immediately
    pub async fn upsert_if_absent(&self, topic: &Topic, record: &CanonicalRecord) -> Result<bool> {
        let mut batch = self.begin(topic).await?;
        batch.ensure_partition().await?;
        let inserted = batch.upsert_if_absent(record).await?;
        batch.commit().await?;
        Ok(inserted)
    }

    /// All partitions, ordered by name
    pub async fn list_topics(&self) -> Result<Vec<Topic>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM topics ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names.iter().map(|n| Topic::from_key(n)).collect())
    }

    /// Full partition contents in insertion order
    pub async fn list_records(&self, topic: &Topic) -> Result<Vec<StoredRecord>> {
        let records = sqlx::query_as::<_, StoredRecord>(
            "SELECT * FROM records WHERE topic = ? ORDER BY id",
        )
        .bind(topic.key())
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Partitions with their record counts
    pub async fn list_topic_summaries(&self) -> Result<Vec<TopicSummary>> {
        let summaries = sqlx::query_as::<_, TopicSummary>(
            r#"
            SELECT t.name, t.created_at, COUNT(r.id) AS record_count
            FROM topics t
            LEFT JOIN records r ON r.topic = t.name
            GROUP BY t.name, t.created_at
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }

    /// Topic names and per-source counts read from one snapshot
    pub async fn source_counts(&self) -> Result<(Vec<String>, Vec<SourceCount>)> {
        let mut tx = self.pool.begin().await?;

        let topics: Vec<String> = sqlx::query_scalar("SELECT name FROM topics ORDER BY name")
            .fetch_all(&mut *tx)
            .await?;

        let counts = sqlx::query_as::<_, SourceCount>(
            r#"
            SELECT topic, source, COUNT(*) AS count
            FROM records
            GROUP BY topic, source
            ORDER BY topic, source
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((topics, counts))
    }

    /// Ingestion history, newest first
    pub async fn list_runs(&self, topic: Option<&Topic>) -> Result<Vec<IngestionRun>> {
        let runs = match topic {
            Some(topic) => {
                sqlx::query_as::<_, IngestionRun>(
                    "SELECT * FROM ingestion_runs WHERE topic = ? ORDER BY started_at DESC",
                )
                .bind(topic.key())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, IngestionRun>(
                    "SELECT * FROM ingestion_runs ORDER BY started_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(runs)
    }

    /// Get global statistics
    pub async fn stats(&self) -> Result<StoreStats> {
        let topic_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM topics")
            .fetch_one(&self.pool)
            .await?;

        let record_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
            .fetch_one(&self.pool)
            .await?;

        let run_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingestion_runs")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreStats {
            topic_count: topic_count as usize,
            record_count: record_count as usize,
            run_count: run_count as usize,
        })
    }

    /// Close the pool, waiting for connections to finish
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn store_unavailable(db_path: &Path, e: impl std::fmt::Display) -> Error {
    Error::StoreUnavailable(format!("{}: {}", db_path.display(), e))
}

/// Uncommitted writes for one topic.
///
/// Reads through the batch see its own pending inserts. Dropping the batch
/// without calling [`TopicBatch::commit`] rolls everything back.
pub struct TopicBatch {
    tx: Transaction<'static, Sqlite>,
    topic: Topic,
    inserted: usize,
}

impl TopicBatch {
    /// Create the partition row if absent
    pub async fn ensure_partition(&mut self) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO topics (name, created_at) VALUES (?, ?)")
            .bind(self.topic.key())
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    /// Whether `url` is stored (or pending) under this batch's topic
    pub async fn exists(&mut self, url: &str) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM records WHERE topic = ? AND url = ? LIMIT 1")
                .bind(self.topic.key())
                .bind(url)
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(found.is_some())
    }

    /// Append `record` unless its URL is already present. Returns whether a
    /// row was written.
    pub async fn upsert_if_absent(&mut self, record: &CanonicalRecord) -> Result<bool> {
        if self.exists(&record.url).await? {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO records (topic, source, headline, url, published_date, ingested_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.topic.key())
        .bind(record.source.display_name())
        .bind(&record.headline)
        .bind(&record.url)
        .bind(&record.published_date)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *self.tx)
        .await?;

        self.inserted += 1;
        Ok(true)
    }

    /// Add the run's history row to this batch
    pub async fn record_run(&mut self, run: &IngestionRun) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ingestion_runs (id, topic, started_at, completed_at, inserted, skipped_duplicate, malformed, source_failures_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&run.id)
        .bind(&run.topic)
        .bind(&run.started_at)
        .bind(&run.completed_at)
        .bind(run.inserted)
        .bind(run.skipped_duplicate)
        .bind(run.malformed)
        .bind(&run.source_failures_json)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    /// Make every write in the batch durable
    pub async fn commit(self) -> Result<()> {
        let topic = self.topic.key().to_string();
        let inserted = self.inserted;
        self.tx.commit().await?;
        info!(topic = %topic, inserted, "Committed batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_test_store() -> (TopicStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.db_file = tmp.path().join("test.db");

        let store = TopicStore::connect(&config).await.unwrap();
        (store, tmp)
    }

    fn topic(name: &str) -> Topic {
        Topic::parse(name, &[]).unwrap()
    }

    fn record(source: SourceKind, url: &str) -> CanonicalRecord {
        CanonicalRecord {
            source,
            headline: format!("Headline for {}", url),
            url: url.to_string(),
            published_date: "2018-11-30T12:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ensure_partition_is_idempotent() {
        let (store, _tmp) = setup_test_store().await;
        let t = topic("Donald Trump");

        store.ensure_partition(&t).await.unwrap();
        store.ensure_partition(&t).await.unwrap();

        let topics = store.list_topics().await.unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].key(), "Donald_Trump");
        assert!(store.list_records(&t).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_if_absent_dedupes_by_url() {
        let (store, _tmp) = setup_test_store().await;
        let t = topic("Trump");

        assert!(store
            .upsert_if_absent(&t, &record(SourceKind::NewYorkTimes, "a"))
            .await
            .unwrap());
        assert!(!store
            .upsert_if_absent(&t, &record(SourceKind::BbcNews, "a"))
            .await
            .unwrap());
        assert!(store.exists(&t, "a").await.unwrap());

        let records = store.list_records(&t).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "New York Times");
        assert_eq!(records[0].kind(), Some(SourceKind::NewYorkTimes));
    }

    #[tokio::test]
    async fn test_url_match_is_exact() {
        let (store, _tmp) = setup_test_store().await;
        let t = topic("Trump");

        store
            .upsert_if_absent(&t, &record(SourceKind::BbcNews, "https://x.com/a"))
            .await
            .unwrap();
        assert!(!store.exists(&t, "https://x.com/a/").await.unwrap());
        assert!(!store.exists(&t, "https://x.com/a?utm=1").await.unwrap());
        assert!(store
            .upsert_if_absent(&t, &record(SourceKind::BbcNews, "https://x.com/a/"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_partition_isolation() {
        let (store, _tmp) = setup_test_store().await;
        let a = topic("A");
        let b = topic("B");

        store
            .upsert_if_absent(&a, &record(SourceKind::YouTube, "U"))
            .await
            .unwrap();
        assert!(store.exists(&a, "U").await.unwrap());
        assert!(!store.exists(&b, "U").await.unwrap());

        assert!(store
            .upsert_if_absent(&b, &record(SourceKind::YouTube, "U"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_insertion_order() {
        let (store, _tmp) = setup_test_store().await;
        let t = topic("Order");
        let urls = ["z", "a", "m", "b"];

        let mut batch = store.begin(&t).await.unwrap();
        batch.ensure_partition().await.unwrap();
        for url in urls {
            assert!(batch
                .upsert_if_absent(&record(SourceKind::WallStreetJournal, url))
                .await
                .unwrap());
        }
        batch.commit().await.unwrap();

        let stored: Vec<String> = store
            .list_records(&t)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(stored, urls.to_vec());
    }

    #[tokio::test]
    async fn test_batch_sees_own_writes_and_rolls_back_on_drop() {
        let (store, _tmp) = setup_test_store().await;
        let t = topic("Rollback");

        {
            let mut batch = store.begin(&t).await.unwrap();
            batch.ensure_partition().await.unwrap();
            assert!(batch
                .upsert_if_absent(&record(SourceKind::BbcNews, "x"))
                .await
                .unwrap());
            assert!(batch.exists("x").await.unwrap());
            assert!(!batch
                .upsert_if_absent(&record(SourceKind::NewYorkTimes, "x"))
                .await
                .unwrap());
            // dropped without commit
        }

        assert!(store.list_topics().await.unwrap().is_empty());
        assert!(!store.exists(&t, "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_source_counts_and_stats() {
        let (store, _tmp) = setup_test_store().await;
        let t1 = topic("T1");
        let t2 = topic("T2");

        for url in ["1", "2"] {
            store
                .upsert_if_absent(&t1, &record(SourceKind::NewYorkTimes, url))
                .await
                .unwrap();
        }
        store
            .upsert_if_absent(&t2, &record(SourceKind::YouTube, "3"))
            .await
            .unwrap();

        let (topics, counts) = store.source_counts().await.unwrap();
        assert_eq!(topics, vec!["T1".to_string(), "T2".to_string()]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].source, "Youtube");

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.topic_count, 2);
        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.run_count, 0);

        let summaries = store.list_topic_summaries().await.unwrap();
        assert_eq!(summaries[0].record_count, 2);
        assert_eq!(summaries[1].record_count, 1);
    }

    #[tokio::test]
    async fn test_record_run_round_trip() {
        let (store, _tmp) = setup_test_store().await;
        let t = topic("Runs");

        let mut run = IngestionRun::new(&t, Utc::now().to_rfc3339());
        run.inserted = 4;
        run.source_failures_json =
            Some(serde_json::to_string(&vec!["Youtube: timed out"]).unwrap());

        let mut batch = store.begin(&t).await.unwrap();
        batch.ensure_partition().await.unwrap();
        batch.record_run(&run).await.unwrap();
        batch.commit().await.unwrap();

        let runs = store.list_runs(Some(&t)).await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].inserted, 4);
        assert_eq!(runs[0].source_failures(), vec!["Youtube: timed out".to_string()]);
    }

    #[tokio::test]
    async fn test_open_unwritable_path_is_store_unavailable() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "not a dir").unwrap();

        let result = TopicStore::open(&blocker.join("db.sqlite")).await;
        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
    }
}
