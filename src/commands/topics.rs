//! Topic listing commands

use crate::error::{Error, Result};
use crate::model::Topic;
use crate::store::{StoredRecord, TopicStore, TopicSummary};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One partition's contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicListing {
    pub topic: String,
    pub total: usize,
    pub records: Vec<StoredRecord>,
}

pub async fn cmd_list_topics(store: &TopicStore) -> Result<Vec<TopicSummary>> {
    info!("Listing topics");
    store.list_topic_summaries().await
}

/// Records of one partition, optionally truncated to the first `limit`
pub async fn cmd_show_topic(
    store: &TopicStore,
    name: &str,
    limit: Option<usize>,
) -> Result<TopicListing> {
    let topic = Topic::parse(name, &[]).ok_or_else(|| Error::TopicNotFound(name.to_string()))?;

    let known = store.list_topics().await?;
    if !known.iter().any(|t| t.key() == topic.key()) {
        return Err(Error::TopicNotFound(topic.key().to_string()));
    }

    let mut records = store.list_records(&topic).await?;
    let total = records.len();
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    Ok(TopicListing {
        topic: topic.key().to_string(),
        total,
        records,
    })
}

pub fn print_topics(topics: &[TopicSummary]) {
    println!("\n🗂 Topics\n");

    if topics.is_empty() {
        println!("No topics stored. Use 'newsledger ingest' to add one.");
        return;
    }

    for topic in topics {
        println!("• {} ({} records)", topic.name, topic.record_count);
        println!("  Created: {}", topic.created_at);
    }
}

pub fn print_topic_listing(listing: &TopicListing) {
    println!(
        "\n📰 {} ({} of {} records)\n",
        listing.topic,
        listing.records.len(),
        listing.total
    );

    for record in &listing.records {
        println!("• {}", record.headline);
        println!("  {} | {}", record.source, record.published_date);
        println!("  {}", record.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalRecord, SourceKind};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_show_topic_accepts_query_or_key() {
        let tmp = TempDir::new().unwrap();
        let store = TopicStore::open(&tmp.path().join("t.db")).await.unwrap();
        let topic = Topic::parse("Donald Trump", &[]).unwrap();
        for url in ["a", "b", "c"] {
            let record = CanonicalRecord {
                source: SourceKind::BbcNews,
                headline: "h".into(),
                url: url.into(),
                published_date: "2018-11-30".into(),
            };
            store.upsert_if_absent(&topic, &record).await.unwrap();
        }

        let listing = cmd_show_topic(&store, "Donald Trump", Some(2)).await.unwrap();
        assert_eq!(listing.total, 3);
        assert_eq!(listing.records.len(), 2);

        let by_key = cmd_show_topic(&store, "Donald_Trump", None).await.unwrap();
        assert_eq!(by_key.records.len(), 3);

        assert!(matches!(
            cmd_show_topic(&store, "Unknown", None).await,
            Err(Error::TopicNotFound(_))
        ));
    }
}
