//! Shared HTTP plumbing for source adapters

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::model::SourceKind;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest slice of an error body carried into a failure reason
const MAX_ERROR_BODY_CHARS: usize = 200;

const MIN_REQUEST_TIMEOUT_MS: u64 = 100;

/// A reqwest client shared by every adapter, with retry on transient failures
#[derive(Clone)]
pub struct SourceClient {
    client: Client,
    retries: usize,
}

impl SourceClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(request_timeout(config))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            retries: config.retries,
        })
    }

    pub fn get(&self, url: url::Url) -> RequestBuilder {
        self.client.get(url)
    }

    /// Send a request and decode the JSON body.
    ///
    /// Every failure is reported as `SourceUnavailable` for `source`.
    /// Transport errors, 429 and 5xx responses are retried.
    pub async fn get_json(&self, source: SourceKind, request: RequestBuilder) -> Result<Value> {
        let mut last_reason = String::from("request was never sent");

        for attempt in 0..=self.retries {
            let req = request.try_clone().ok_or_else(|| {
                Error::source_unavailable(source, "failed to clone request")
            })?;

            let retryable = match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<Value>().await.map_err(|e| {
                            Error::source_unavailable(source, format!("invalid JSON body: {}", e))
                        });
                    }

                    let body = response.text().await.unwrap_or_default();
                    last_reason = format!("HTTP {}: {}", status, error_detail(&body));
                    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                }
                Err(e) => {
                    last_reason = if e.is_timeout() {
                        "request timed out".to_string()
                    } else {
                        e.to_string()
                    };
                    true
                }
            };

            if !retryable {
                break;
            }

            if attempt < self.retries {
                debug!(source = %source, attempt, "Retrying after: {}", last_reason);
                tokio::time::sleep(Duration::from_millis(200 * (attempt + 1) as u64)).await;
            }
        }

        warn!(source = %source, "Fetch failed: {}", last_reason);
        Err(Error::source_unavailable(source, last_reason))
    }
}

/// Per-attempt timeout. `timeout_secs` bounds a whole fetch, so it is split
/// across the first attempt and every retry.
fn request_timeout(config: &FetchConfig) -> Duration {
    let attempts = config.retries as u64 + 1;
    let per_attempt = Duration::from_millis(config.timeout_secs.saturating_mul(1000) / attempts);
    per_attempt.max(Duration::from_millis(MIN_REQUEST_TIMEOUT_MS))
}

/// Pull a human-readable message out of an error body
fn error_detail(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let message = json
            .pointer("/message")
            .or_else(|| json.pointer("/error/message"))
            .or_else(|| json.pointer("/fault/faultstring"))
            .and_then(Value::as_str);
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// Read an API key from the named environment variable
pub fn resolve_api_key(env_name: &str) -> Option<String> {
    if env_name.is_empty() {
        return None;
    }
    std::env::var(env_name)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Credential handed to an adapter at construction time
#[derive(Clone)]
pub struct ApiKey {
    value: Option<String>,
    env_name: String,
}

impl ApiKey {
    pub fn new(value: Option<String>, env_name: impl Into<String>) -> Self {
        Self {
            value,
            env_name: env_name.into(),
        }
    }

    pub fn from_env(env_name: &str) -> Self {
        Self::new(resolve_api_key(env_name), env_name)
    }

    /// The key, or `SourceUnavailable` naming the variable to set
    pub fn require(&self, source: SourceKind) -> Result<&str> {
        self.value.as_deref().ok_or_else(|| {
            Error::source_unavailable(
                source,
                format!("API key not configured (set {})", self.env_name),
            )
        })
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("env_name", &self.env_name)
            .field("present", &self.value.is_some())
            .finish()
    }
}
