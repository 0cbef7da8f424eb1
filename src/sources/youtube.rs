//! YouTube Data API v3 video search adapter

use super::http::{ApiKey, SourceClient};
use super::{RawItem, SourceAdapter};
use crate::config::{DateWindow, YouTubeConfig};
use crate::error::{Error, Result};
use crate::model::SourceKind;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

const SEARCH_PATH: &str = "youtube/v3/search";

pub struct YouTubeAdapter {
    client: SourceClient,
    base_url: Url,
    api_key: ApiKey,
    window: DateWindow,
}

impl YouTubeAdapter {
    pub fn new(client: SourceClient, config: &YouTubeConfig, api_key: ApiKey) -> Result<Self> {
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
            .append_pair("part", "snippet")
            .append_pair("type", "video")
            .append_pair(
                "publishedAfter",
                &self.window.from.format("%Y-%m-%dT00:00:00Z").to_string(),
            )
            .append_pair(
                "publishedBefore",
                &self.window.to.format("%Y-%m-%dT00:00:00Z").to_string(),
            )
            .append_pair("key", key);
        Ok(url)
    }
}

#[async_trait]
impl SourceAdapter for YouTubeAdapter {
    fn source(&self) -> SourceKind {
        SourceKind::YouTube
    }

    async fn fetch(&self, topic: &str) -> Result<Vec<RawItem>> {
        let source = self.source();
        let key = self.api_key.require(source)?;
        let url = self.search_url(topic, key)?;

        debug!(source = %source, topic, "Searching videos");
        let body = self.client.get_json(source, self.client.get(url)).await?;

        match body.get("items") {
            Some(Value::Array(items)) => Ok(items.clone()),
            // The API omits `items` entirely when nothing matched
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(_) => Err(Error::source_unavailable(source, "'items' is not a list")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_youtube, FetchConfig};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> YouTubeAdapter {
        let mut config = default_youtube();
        config.base_url = server.uri();
        let fetch = FetchConfig {
            retries: 0,
            ..FetchConfig::default()
        };
        YouTubeAdapter::new(
            SourceClient::new(&fetch).unwrap(),
            &config,
            ApiKey::new(Some("yt".to_string()), "YOUTUBE_API_KEY"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_video_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .and(query_param("q", "Trump"))
            .and(query_param("type", "video"))
            .and(query_param("publishedAfter", "2018-11-26T00:00:00Z"))
            .and(query_param("publishedBefore", "2018-12-02T00:00:00Z"))
            .and(query_param("key", "yt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "youtube#searchListResponse",
                "items": [
                    {"id": {"kind": "youtube#video", "videoId": "abc123"},
                     "snippet": {"title": "Clip", "publishedAt": "2018-11-29T08:00:00Z"}}
                ]
            })))
            .mount(&server)
            .await;

        let items = adapter(&server).fetch("Trump").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"]["videoId"], "abc123");
    }

    #[tokio::test]
    async fn test_fetch_missing_items_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"kind": "youtube#searchListResponse"})),
            )
            .mount(&server)
            .await;

        assert!(adapter(&server).fetch("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_quota_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "quotaExceeded"}
            })))
            .mount(&server)
            .await;

        let err = adapter(&server).fetch("Trump").await.unwrap_err();
        assert!(err.to_string().contains("quotaExceeded"));
    }
}
