//! Per-topic, per-source record counts

use crate::error::Result;
use crate::store::{SourceCount, TopicStore};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Dense topic x source count table.
///
/// Every source seen under any topic has an entry under every topic, zero
/// when the topic has no records from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateCount {
    counts: BTreeMap<String, BTreeMap<String, u64>>,
    sources: BTreeSet<String>,
}

impl AggregateCount {
    /// Build the dense table from topic names and the sparse counts
    pub fn from_counts(topics: Vec<String>, counts: Vec<SourceCount>) -> Self {
        let sources: BTreeSet<String> = counts.iter().map(|c| c.source.clone()).collect();

        let mut table: BTreeMap<String, BTreeMap<String, u64>> = topics
            .into_iter()
            .map(|topic| {
                let zeros = sources.iter().map(|s| (s.clone(), 0)).collect();
                (topic, zeros)
            })
            .collect();

        for count in counts {
            let row = table.entry(count.topic).or_insert_with(|| {
                sources.iter().map(|s| (s.clone(), 0)).collect()
            });
            row.insert(count.source, count.count.max(0) as u64);
        }

        Self {
            counts: table,
            sources,
        }
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    pub fn get(&self, topic: &str, source: &str) -> Option<u64> {
        self.counts.get(topic).and_then(|row| row.get(source)).copied()
    }

    /// Counts for one topic, keyed by source
    pub fn row(&self, topic: &str) -> Option<&BTreeMap<String, u64>> {
        self.counts.get(topic)
    }

    /// `(topic, source, count)` triples, topic-major
    pub fn rows(&self) -> Vec<(&str, &str, u64)> {
        self.counts
            .iter()
            .flat_map(|(topic, row)| {
                row.iter()
                    .map(move |(source, count)| (topic.as_str(), source.as_str(), *count))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Aggregate every partition in the store from one consistent read
pub async fn aggregate(store: &TopicStore) -> Result<AggregateCount> {
    let (topics, counts) = store.source_counts().await?;
    debug!(topics = topics.len(), groups = counts.len(), "Aggregating counts");
    Ok(AggregateCount::from_counts(topics, counts))
}
