//! Ingest command implementation

use crate::config::Config;
use crate::error::Result;
use crate::ingest::{IngestionReport, Ingestor};
use crate::sources::create_adapters;
use crate::store::TopicStore;
use std::io::{self, Write};

/// Run one ingestion for `topic` against every enabled source
pub async fn cmd_ingest(
    config: &Config,
    store: &TopicStore,
    topic: &str,
) -> Result<Option<IngestionReport>> {
    let adapters = create_adapters(config)?;
    let ingestor = Ingestor::from_config(config, store.clone(), adapters);
    ingestor.ingest(topic).await
}

/// Ask for a topic on stdin
pub fn prompt_topic() -> Result<String> {
    print!("Topic to ingest: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub fn print_ingest_report(report: Option<&IngestionReport>) {
    let Some(report) = report else {
        println!("No topic given, nothing ingested.");
        return;
    };

    println!("\n✓ Ingestion complete for '{}'", report.topic);
    println!("  Items fetched: {}", report.fetched);
    println!("  Records inserted: {}", report.inserted);
    println!("  Duplicates skipped: {}", report.skipped_duplicate);

    if !report.malformed.is_empty() {
        println!("  Malformed items dropped: {}", report.malformed.len());
        for item in &report.malformed {
            println!("    - {} (missing {})", item.source, item.field);
        }
    }

    if !report.source_failures.is_empty() {
        println!("\n⚠ Sources unavailable:");
        for failure in &report.source_failures {
            println!("  • {}", failure);
        }
    }
}
