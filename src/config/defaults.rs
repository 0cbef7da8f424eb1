//! Default values for configuration

use super::{DateWindow, NewsApiConfig, NytConfig, YouTubeConfig};
use chrono::NaiveDate;

/// Default request timeout in seconds
pub fn default_fetch_timeout() -> u64 {
    30
}

/// Default number of retries after a failed request
pub fn default_fetch_retries() -> usize {
    1
}

/// Default user agent
pub fn default_fetch_user_agent() -> String {
    format!("newsledger/{} (Topic Coverage Ledger)", env!("CARGO_PKG_VERSION"))
}

/// Topic strings treated as "no topic given"
pub fn default_placeholder_topics() -> Vec<String> {
    ["none", "n/a", "-", "?"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Default: sources enabled
pub fn default_source_enabled() -> bool {
    true
}

/// Default search window (the week of 2018-11-26)
pub fn default_window() -> DateWindow {
    DateWindow {
        from: NaiveDate::from_ymd_opt(2018, 11, 26).unwrap_or(NaiveDate::MIN),
        to: NaiveDate::from_ymd_opt(2018, 12, 2).unwrap_or(NaiveDate::MIN),
    }
}

/// Default NYT article search host
pub fn default_nyt_base_url() -> String {
    std::env::var("NEWSLEDGER_NYT_URL").unwrap_or_else(|_| "https://api.nytimes.com".to_string())
}

/// Default NewsAPI host
pub fn default_newsapi_base_url() -> String {
    std::env::var("NEWSLEDGER_NEWSAPI_URL").unwrap_or_else(|_| "https://newsapi.org".to_string())
}

/// Default YouTube Data API host
pub fn default_youtube_base_url() -> String {
    std::env::var("NEWSLEDGER_YOUTUBE_URL")
        .unwrap_or_else(|_| "https://www.googleapis.com".to_string())
}

pub fn default_newsapi_language() -> String {
    "en".to_string()
}

pub fn default_nyt_key_env() -> String {
    "NYT_API_KEY".to_string()
}

pub fn default_newsapi_key_env() -> String {
    "NEWSAPI_KEY".to_string()
}

pub fn default_youtube_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}

pub fn default_wsj_outlet() -> String {
    "the-wall-street-journal".to_string()
}

pub fn default_bbc_outlet() -> String {
    "bbc-news".to_string()
}

pub fn default_nyt() -> NytConfig {
    NytConfig {
        enabled: default_source_enabled(),
        base_url: default_nyt_base_url(),
        api_key_env: default_nyt_key_env(),
        window: default_window(),
    }
}

pub fn default_wsj() -> NewsApiConfig {
    NewsApiConfig {
        enabled: default_source_enabled(),
        base_url: default_newsapi_base_url(),
        api_key_env: default_newsapi_key_env(),
        outlet: default_wsj_outlet(),
        language: default_newsapi_language(),
        window: default_window(),
    }
}

pub fn default_bbc() -> NewsApiConfig {
    NewsApiConfig {
        outlet: default_bbc_outlet(),
        ..default_wsj()
    }
}

pub fn default_youtube() -> YouTubeConfig {
    YouTubeConfig {
        enabled: default_source_enabled(),
        base_url: default_youtube_base_url(),
        api_key_env: default_youtube_key_env(),
        window: default_window(),
    }
}
