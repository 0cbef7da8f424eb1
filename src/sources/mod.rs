//! Content source adapters
//!
//! Each adapter knows one provider's endpoint, query window and parameter
//! mapping. The only runtime input is the topic string; credentials come in
//! through the constructor.

mod http;
mod newsapi;
mod nyt;
mod youtube;

pub use http::*;
pub use newsapi::*;
pub use nyt::*;
pub use youtube::*;

use crate::config::Config;
use crate::error::Result;
use crate::model::SourceKind;
use async_trait::async_trait;
use tracing::{debug, info};

/// One item exactly as a source returned it
pub type RawItem = serde_json::Value;

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which provider this adapter talks to
    fn source(&self) -> SourceKind;

    /// Fetch the source's first page of results for `topic`.
    ///
    /// An empty vector means the source had nothing; any failure to talk to
    /// the source is `Error::SourceUnavailable`.
    async fn fetch(&self, topic: &str) -> Result<Vec<RawItem>>;
}

/// Build the enabled adapters in their fixed ingestion order
pub fn create_adapters(config: &Config) -> Result<Vec<Box<dyn SourceAdapter>>> {
    let client = SourceClient::new(&config.fetch)?;
    let sources = &config.sources;
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();

    for kind in SourceKind::ALL {
        let adapter: Box<dyn SourceAdapter> = match kind {
            SourceKind::NewYorkTimes if sources.nyt.enabled => Box::new(NytAdapter::new(
                client.clone(),
                &sources.nyt,
                ApiKey::from_env(&sources.nyt.api_key_env),
            )?),
            SourceKind::WallStreetJournal if sources.wsj.enabled => {
                Box::new(NewsApiAdapter::new(
                    kind,
                    client.clone(),
                    &sources.wsj,
                    ApiKey::from_env(&sources.wsj.api_key_env),
                )?)
            }
            SourceKind::BbcNews if sources.bbc.enabled => Box::new(NewsApiAdapter::new(
                kind,
                client.clone(),
                &sources.bbc,
                ApiKey::from_env(&sources.bbc.api_key_env),
            )?),
            SourceKind::YouTube if sources.youtube.enabled => Box::new(YouTubeAdapter::new(
                client.clone(),
                &sources.youtube,
                ApiKey::from_env(&sources.youtube.api_key_env),
            )?),
            _ => {
                debug!(source = %kind, "Source disabled in config");
                continue;
            }
        };
        adapters.push(adapter);
    }

    info!("Configured {} source adapter(s)", adapters.len());
    Ok(adapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_adapters_keeps_fixed_order() {
        let config = Config::default();
        let adapters = create_adapters(&config).unwrap();
        let order: Vec<SourceKind> = adapters.iter().map(|a| a.source()).collect();
        assert_eq!(order, SourceKind::ALL.to_vec());
    }

    #[test]
    fn test_create_adapters_skips_disabled() {
        let mut config = Config::default();
        config.sources.wsj.enabled = false;
        config.sources.youtube.enabled = false;
        let adapters = create_adapters(&config).unwrap();
        let order: Vec<SourceKind> = adapters.iter().map(|a| a.source()).collect();
        assert_eq!(order, vec![SourceKind::NewYorkTimes, SourceKind::BbcNews]);
    }
}
