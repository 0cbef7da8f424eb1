//! NewsAPI.org adapter, one instance per outlet
//!
//! https://newsapi.org/docs/endpoints/everything

use super::http::{ApiKey, SourceClient};
use super::{RawItem, SourceAdapter};
use crate::config::{DateWindow, NewsApiConfig};
use crate::error::{Error, Result};
use crate::model::SourceKind;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

const EVERYTHING_PATH: &str = "v2/everything";

pub struct NewsApiAdapter {
    source: SourceKind,
    client: SourceClient,
    base_url: Url,
    api_key: ApiKey,
    outlet: String,
    language: String,
    window: DateWindow,
}

impl NewsApiAdapter {
    pub fn new(
        source: SourceKind,
        client: SourceClient,
        config: &NewsApiConfig,
        api_key: ApiKey,
    ) -> Result<Self> {
        Ok(Self {
            source,
            client,
            base_url: Url::parse(&config.base_url)?,
            api_key,
            outlet: config.outlet.clone(),
            language: config.language.clone(),
            window: config.window,
        })
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self.base_url.join(EVERYTHING_PATH)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("sources", &self.outlet)
            .append_pair("language", &self.language)
            .append_pair("from", &self.window.from.format("%Y-%m-%d").to_string())
            .append_pair("to", &self.window.to.format("%Y-%m-%d").to_string());
        Ok(url)
    }
}

#[async_trait]
impl SourceAdapter for NewsApiAdapter {
    fn source(&self) -> SourceKind {
        self.source
    }

    async fn fetch(&self, topic: &str) -> Result<Vec<RawItem>> {
        let key = self.api_key.require(self.source)?;
        let url = self.search_url(topic)?;

        debug!(source = %self.source, outlet = %self.outlet, topic, "Searching articles");
        let request = self.client.get(url).header("X-Api-Key", key);
        let body = self.client.get_json(self.source, request).await?;

        let status = body.get("status").and_then(Value::as_str).unwrap_or("");
        if status != "ok" {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(Error::source_unavailable(
                self.source,
                format!("API returned status '{}': {}", status, message),
            ));
        }

        match body.get("articles") {
            Some(Value::Array(articles)) => Ok(articles.clone()),
            _ => Err(Error::source_unavailable(
                self.source,
                "response is missing 'articles'",
            )),
        }
    }
}
