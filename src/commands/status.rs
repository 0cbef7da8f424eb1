//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::model::SourceKind;
use crate::sources::resolve_api_key;
use crate::store::{IngestionRun, StoreStats, TopicStore};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Per-source configuration summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStatus {
    pub source: SourceKind,
    pub enabled: bool,
    pub api_key_env: String,
    pub api_key_present: bool,
}

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub db_path: String,
    pub sources: Vec<SourceStatus>,
    pub stats: StoreStats,
    pub last_run: Option<IngestionRun>,
}

/// Get system status
pub async fn cmd_status(config: &Config, store: &TopicStore) -> Result<StatusInfo> {
    info!("Getting status");

    let stats = store.stats().await?;
    let last_run = store.list_runs(None).await?.into_iter().next();

    let sources = SourceKind::ALL
        .into_iter()
        .map(|source| {
            let env = config.sources.api_key_env(source);
            SourceStatus {
                source,
                enabled: config.sources.is_enabled(source),
                api_key_env: env.to_string(),
                api_key_present: resolve_api_key(env).is_some(),
            }
        })
        .collect();

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
        sources,
        stats,
        last_run,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 newsledger Status\n");
    println!("Configuration: {}", status.config_path);
    println!("Database: {}", status.db_path);

    println!("\nSources:");
    for source in &status.sources {
        let state = match (source.enabled, source.api_key_present) {
            (false, _) => "disabled".to_string(),
            (true, true) => "✓ ready".to_string(),
            (true, false) => format!("✗ {} not set", source.api_key_env),
        };
        println!("  {:<24} {}", source.source.display_name(), state);
    }

    println!("\nDatabase Stats:");
    println!("  Topics: {}", status.stats.topic_count);
    println!("  Records: {}", status.stats.record_count);
    println!("  Ingestion runs: {}", status.stats.run_count);

    if let Some(run) = &status.last_run {
        println!(
            "\nLast run: {} at {} ({} inserted, {} duplicates)",
            run.topic, run.completed_at, run.inserted, run.skipped_duplicate
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_on_empty_store() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.sources.youtube.enabled = false;
        let store = TopicStore::connect(&config).await.unwrap();

        let status = cmd_status(&config, &store).await.unwrap();
        assert_eq!(status.stats.topic_count, 0);
        assert!(status.last_run.is_none());
        assert_eq!(status.sources.len(), 4);
        assert!(!status.sources[3].enabled);
    }
}
