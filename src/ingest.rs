//! Ingestion coordinator: sources -> normalizer -> topic store

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{SourceKind, Topic};
use crate::normalize::normalize;
use crate::progress::source_progress_bar;
use crate::sources::{RawItem, SourceAdapter};
use crate::store::{IngestionRun, TopicStore};
use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A source that could not be fetched during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub reason: String,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

/// An item dropped because it could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedItem {
    pub source: SourceKind,
    pub field: String,
}

/// Outcome of one committed ingestion run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestionReport {
    pub topic: String,
    pub fetched: usize,
    pub inserted: usize,
    pub skipped_duplicate: usize,
    pub source_failures: Vec<SourceFailure>,
    pub malformed: Vec<MalformedItem>,
}

/// Drives every adapter for a topic and persists the results in one batch
pub struct Ingestor {
    store: TopicStore,
    adapters: Vec<Box<dyn SourceAdapter>>,
    fetch_timeout: Duration,
    placeholder_topics: Vec<String>,
}

impl Ingestor {
    /// `adapters` are driven, and their results stored, in the given order
    pub fn new(
        store: TopicStore,
        adapters: Vec<Box<dyn SourceAdapter>>,
        fetch_timeout: Duration,
        placeholder_topics: Vec<String>,
    ) -> Self {
        Self {
            store,
            adapters,
            fetch_timeout,
            placeholder_topics,
        }
    }

    pub fn from_config(
        config: &Config,
        store: TopicStore,
        adapters: Vec<Box<dyn SourceAdapter>>,
    ) -> Self {
        Self::new(
            store,
            adapters,
            Duration::from_secs(config.fetch.timeout_secs),
            config.ingest.placeholder_topics.clone(),
        )
    }

    /// Run one ingestion for `input`.
    ///
    /// Returns `Ok(None)` without touching the store when the input is empty
    /// or a placeholder. Source and record problems are collected in the
    /// report; only store failures are returned as errors, in which case
    /// nothing from the run is committed.
    pub async fn ingest(&self, input: &str) -> Result<Option<IngestionReport>> {
        let Some(topic) = Topic::parse(input, &self.placeholder_topics) else {
            info!("No topic given, nothing to ingest");
            return Ok(None);
        };

        info!(topic = %topic, "Starting ingestion");
        let started_at = Utc::now().to_rfc3339();

        let fetched = self.fetch_all(topic.query()).await;

        let mut batch = self.store.begin(&topic).await?;
        batch.ensure_partition().await?;

        let mut report = IngestionReport {
            topic: topic.key().to_string(),
            ..Default::default()
        };

        for (source, result) in fetched {
            let items = match result {
                Ok(items) => items,
                Err(e) => {
                    let reason = match e {
                        Error::SourceUnavailable { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    warn!(source = %source, "Skipping source: {}", reason);
                    report.source_failures.push(SourceFailure { source, reason });
                    continue;
                }
            };

            debug!(source = %source, items = items.len(), "Storing fetched items");
            report.fetched += items.len();

            for raw in &items {
                let record = match normalize(source, raw) {
                    Ok(record) => record,
                    Err(Error::MalformedRecord { provider, field }) => {
                        warn!(source = %provider, field = %field, "Dropping malformed item");
                        report.malformed.push(MalformedItem {
                            source: provider,
                            field,
                        });
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                if batch.upsert_if_absent(&record).await? {
                    report.inserted += 1;
                } else {
                    debug!(url = %record.url, "Skipping duplicate");
                    report.skipped_duplicate += 1;
                }
            }
        }

        let mut run = IngestionRun::new(&topic, started_at);
        run.inserted = report.inserted as i64;
        run.skipped_duplicate = report.skipped_duplicate as i64;
        run.malformed = report.malformed.len() as i64;
        if !report.source_failures.is_empty() {
            let failures: Vec<String> =
                report.source_failures.iter().map(|f| f.to_string()).collect();
            run.source_failures_json = Some(serde_json::to_string(&failures)?);
        }
        batch.record_run(&run).await?;
        batch.commit().await?;

        info!(
            topic = %topic,
            inserted = report.inserted,
            duplicates = report.skipped_duplicate,
            failed_sources = report.source_failures.len(),
            malformed = report.malformed.len(),
            "Ingestion complete"
        );

        Ok(Some(report))
    }

    /// Fetch every adapter concurrently. Results come back in adapter order
    /// regardless of completion order.
    async fn fetch_all(&self, query: &str) -> Vec<(SourceKind, Result<Vec<RawItem>>)> {
        let progress = source_progress_bar(self.adapters.len() as u64);
        progress.set_message(format!("Fetching '{}'", query));

        let fetches = self.adapters.iter().map(|adapter| {
            let progress = progress.clone();
            async move {
                let source = adapter.source();
                let result = match tokio::time::timeout(self.fetch_timeout, adapter.fetch(query))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(Error::source_unavailable(
                        source,
                        format!("no response within {:?}", self.fetch_timeout),
                    )),
                };
                progress.inc(1);
                (source, result)
            }
        });

        let results = join_all(fetches).await;
        progress.finish_and_clear();
        results
    }
}
