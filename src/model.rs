//! Core domain types: topics, sources and canonical records

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The fixed set of content providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[serde(rename = "nyt")]
    NewYorkTimes,
    #[serde(rename = "wsj")]
    WallStreetJournal,
    #[serde(rename = "bbc")]
    BbcNews,
    YouTube,
}

impl SourceKind {
    /// All sources in the order adapters are driven during ingestion
    pub const ALL: [SourceKind; 4] = [
        SourceKind::NewYorkTimes,
        SourceKind::WallStreetJournal,
        SourceKind::BbcNews,
        SourceKind::YouTube,
    ];

    /// Name written to the `source` column and shown in reports
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::NewYorkTimes => "New York Times",
            SourceKind::WallStreetJournal => "The Wall Street Journal",
            SourceKind::BbcNews => "BBC News",
            SourceKind::YouTube => "Youtube",
        }
    }

    /// Short identifier used in configuration
    pub fn id(&self) -> &'static str {
        match self {
            SourceKind::NewYorkTimes => "nyt",
            SourceKind::WallStreetJournal => "wsj",
            SourceKind::BbcNews => "bbc",
            SourceKind::YouTube => "youtube",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SourceKind {
    type Err = Error;

    /// Accepts either the short id or the display name.
    fn from_str(s: &str) -> Result<Self> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(s) || kind.display_name() == s)
            .ok_or_else(|| Error::Config(format!("Unknown source: {}", s)))
    }
}

/// A search topic.
///
/// `query` is what adapters search for; `key` names the partition in the
/// store (spaces become underscores, case is preserved).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    query: String,
    key: String,
}

impl Topic {
    /// Parse user input into a topic.
    ///
    /// Returns `None` for empty input and for any of the configured
    /// placeholder strings (compared case-insensitively).
    pub fn parse(input: &str, placeholders: &[String]) -> Option<Self> {
        let query = input.trim();
        if query.is_empty() {
            return None;
        }
        if placeholders
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(query))
        {
            return None;
        }

        Some(Self {
            query: query.to_string(),
            key: query.replace(' ', "_"),
        })
    }

    /// Build a topic from a stored partition key
    pub fn from_key(key: &str) -> Self {
        Self {
            query: key.replace('_', " "),
            key: key.to_string(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key)
    }
}

/// A normalized item, independent of which source produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub source: SourceKind,
    pub headline: String,
    /// Deduplication key, compared verbatim
    pub url: String,
    /// Timestamp exactly as the source reported it
    pub published_date: String,
}
