//! Custom error types for newsledger

use crate::model::SourceKind;
use thiserror::Error;

/// Main error type for newsledger operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A content source could not be reached, rejected our credentials, or
    /// answered with something we could not decode.
    #[error("Source unavailable ({provider}): {reason}")]
    SourceUnavailable { provider: SourceKind, reason: String },

    /// One fetched item lacked a field the normalizer needs.
    #[error("Malformed record from {provider}: missing or invalid '{field}'")]
    MalformedRecord { provider: SourceKind, field: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Not initialized: run 'newsledger init' first")]
    NotInitialized,

    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn source_unavailable(provider: SourceKind, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            provider,
            reason: reason.into(),
        }
    }

    pub fn malformed(provider: SourceKind, field: impl Into<String>) -> Self {
        Error::MalformedRecord {
            provider,
            field: field.into(),
        }
    }
}

/// Result type alias for newsledger
pub type Result<T> = std::result::Result<T, Error>;
