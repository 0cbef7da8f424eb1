//! New York Times article search adapter

use super::http::{ApiKey, SourceClient};
use super::{RawItem, SourceAdapter};
use crate::config::{DateWindow, NytConfig};
use crate::error::{Error, Result};
use crate::model::SourceKind;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

const SEARCH_PATH: &str = "svc/search/v2/articlesearch.json";

pub struct NytAdapter {
    client: SourceClient,
    base_url: Url,
    api_key: ApiKey,
    window: DateWindow,
}

impl NytAdapter {
    pub fn new(client: SourceClient, config: &NytConfig, api_key: ApiKey) -> Result<Self> {
        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            api_key,
            window: config.window,
        })
    }

    fn search_url(&self, query: &str, key: &str) -> Result<Url> {
        let mut url = self.base_url.join(SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("api-key", key)
            .append_pair("begin_date", &self.window.from.format("%Y%m%d").to_string())
            .append_pair("end_date", &self.window.to.format("%Y%m%d").to_string());
        Ok(url)
    }
}

#[async_trait]
impl SourceAdapter for NytAdapter {
    fn source(&self) -> SourceKind {
        SourceKind::NewYorkTimes
    }

    async fn fetch(&self, topic: &str) -> Result<Vec<RawItem>> {
        let source = self.source();
        let key = self.api_key.require(source)?;
        let url = self.search_url(topic, key)?;

        debug!(source = %source, topic, "Searching articles");
        let body = self.client.get_json(source, self.client.get(url)).await?;

        // `docs` is null rather than [] on some empty result pages
        match body.pointer("/response/docs") {
            Some(Value::Array(docs)) => Ok(docs.clone()),
            Some(Value::Null) => Ok(Vec::new()),
            _ => Err(Error::source_unavailable(
                source,
                "response is missing 'response.docs'",
            )),
        }
    }
}
