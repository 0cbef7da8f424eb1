//! Configuration management for newsledger
//!
//! Handles loading, saving, and validating configuration from TOML files.
//! API keys are never stored here: each source names the environment
//! variable its key is read from.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::model::SourceKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch settings shared by all sources
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Ingestion behaviour
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Per-source settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-source time budget in seconds, shared by the first attempt and
    /// its retries; a source that takes longer is reported as unavailable
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Retries after a failed request (0 = single attempt)
    #[serde(default = "default_fetch_retries")]
    pub retries: usize,

    /// User agent string
    #[serde(default = "default_fetch_user_agent")]
    pub user_agent: String,
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Inputs treated as "no topic" (case-insensitive)
    #[serde(default = "default_placeholder_topics")]
    pub placeholder_topics: Vec<String>,
}

/// Inclusive date range a source is queried over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SourcesSections")]
pub struct SourcesConfig {
    pub nyt: NytConfig,
    pub wsj: NewsApiConfig,
    pub bbc: NewsApiConfig,
    pub youtube: YouTubeConfig,
}

/// `[sources]` as written in the file; outlets left out fall back per source
#[derive(Deserialize)]
struct SourcesSections {
    #[serde(default = "default_nyt")]
    nyt: NytConfig,

    #[serde(default = "default_wsj")]
    wsj: NewsApiConfig,

    #[serde(default = "default_bbc")]
    bbc: NewsApiConfig,

    #[serde(default = "default_youtube")]
    youtube: YouTubeConfig,
}

impl From<SourcesSections> for SourcesConfig {
    fn from(sections: SourcesSections) -> Self {
        let mut wsj = sections.wsj;
        if wsj.outlet.trim().is_empty() {
            wsj.outlet = default_wsj_outlet();
        }
        let mut bbc = sections.bbc;
        if bbc.outlet.trim().is_empty() {
            bbc.outlet = default_bbc_outlet();
        }

        Self {
            nyt: sections.nyt,
            wsj,
            bbc,
            youtube: sections.youtube,
        }
    }
}

impl SourcesConfig {
    pub fn is_enabled(&self, source: SourceKind) -> bool {
        match source {
            SourceKind::NewYorkTimes => self.nyt.enabled,
            SourceKind::WallStreetJournal => self.wsj.enabled,
            SourceKind::BbcNews => self.bbc.enabled,
            SourceKind::YouTube => self.youtube.enabled,
        }
    }

    /// Name of the environment variable holding `source`'s API key
    pub fn api_key_env(&self, source: SourceKind) -> &str {
        match source {
            SourceKind::NewYorkTimes => &self.nyt.api_key_env,
            SourceKind::WallStreetJournal => &self.wsj.api_key_env,
            SourceKind::BbcNews => &self.bbc.api_key_env,
            SourceKind::YouTube => &self.youtube.api_key_env,
        }
    }
}

/// New York Times article search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NytConfig {
    #[serde(default = "default_source_enabled")]
    pub enabled: bool,

    #[serde(default = "default_nyt_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_nyt_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_window")]
    pub window: DateWindow,
}

/// NewsAPI "everything" search restricted to one outlet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsApiConfig {
    #[serde(default = "default_source_enabled")]
    pub enabled: bool,

    #[serde(default = "default_newsapi_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_newsapi_key_env")]
    pub api_key_env: String,

    /// NewsAPI source id, e.g. `bbc-news`
    #[serde(default)]
    pub outlet: String,

    #[serde(default = "default_newsapi_language")]
    pub language: String,

    #[serde(default = "default_window")]
    pub window: DateWindow,
}

/// YouTube Data API v3 video search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    #[serde(default = "default_source_enabled")]
    pub enabled: bool,

    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_youtube_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_window")]
    pub window: DateWindow,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for newsledger data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            ingest: IngestConfig::default(),
            sources: SourcesConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            retries: default_fetch_retries(),
            user_agent: default_fetch_user_agent(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            placeholder_topics: default_placeholder_topics(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            nyt: default_nyt(),
            wsj: default_wsj(),
            bbc: default_bbc(),
            youtube: default_youtube(),
        }
    }
}

impl Config {
    /// Get the default base directory for newsledger (~/.newsledger)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".newsledger")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            db_file: base.join("newsledger.db"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            db_file: base.join("newsledger.db"),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory, falling back to
    /// defaults when no config file exists there
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Check if newsledger is initialized (config and DB exist)
    pub fn is_initialized(&self) -> bool {
        self.paths.config_file.exists() && self.paths.db_file.exists()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(Error::Config(
                "fetch.timeout_secs must be positive".to_string(),
            ));
        }

        let sources = &self.sources;
        let checks = [
            ("nyt", &sources.nyt.base_url, &sources.nyt.window),
            ("wsj", &sources.wsj.base_url, &sources.wsj.window),
            ("bbc", &sources.bbc.base_url, &sources.bbc.window),
            ("youtube", &sources.youtube.base_url, &sources.youtube.window),
        ];

        for (name, base_url, window) in checks {
            Url::parse(base_url).map_err(|e| {
                Error::Config(format!("sources.{}.base_url is invalid: {}", name, e))
            })?;

            if window.from > window.to {
                return Err(Error::Config(format!(
                    "sources.{}.window.from must not be after window.to",
                    name
                )));
            }
        }

        for (name, outlet) in [("wsj", &sources.wsj.outlet), ("bbc", &sources.bbc.outlet)] {
            if outlet.trim().is_empty() {
                return Err(Error::Config(format!(
                    "sources.{}.outlet must not be empty",
                    name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sources.wsj.outlet, "the-wall-street-journal");
        assert_eq!(config.sources.bbc.outlet, "bbc-news");
        assert_eq!(
            config.sources.nyt.window.from,
            NaiveDate::from_ymd_opt(2018, 11, 26).unwrap()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.fetch.timeout_secs = 7;
        config.sources.youtube.enabled = false;

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(loaded.fetch.timeout_secs, 7);
        assert!(!loaded.sources.youtube.enabled);
        assert_eq!(loaded.paths.db_file, tmp.path().join("newsledger.db"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [sources.bbc]
            api_key_env = "MY_BBC_KEY"
            outlet = "bbc-sport"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sources.bbc.api_key_env, "MY_BBC_KEY");
        assert_eq!(config.sources.bbc.outlet, "bbc-sport");
        assert_eq!(config.sources.bbc.language, "en");
        assert_eq!(config.sources.wsj.outlet, "the-wall-street-journal");
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_load_from_requires_database_to_be_initialized() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!config.is_initialized());

        config.save().unwrap();
        assert!(!config.is_initialized());
        std::fs::write(&config.paths.db_file, b"").unwrap();
        assert!(config.is_initialized());
    }

    #[test]
    fn test_section_with_only_enabled_flag() {
        let config: Config = toml::from_str("[sources.youtube]\nenabled = false\n").unwrap();
        assert!(!config.sources.youtube.enabled);
        assert_eq!(config.sources.youtube.api_key_env, "YOUTUBE_API_KEY");
        assert!(config.sources.is_enabled(SourceKind::NewYorkTimes));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_newsapi_sections_keep_their_own_outlet() {
        let toml = r#"
            [sources.wsj]
            enabled = false

            [sources.bbc]
            language = "de"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sources.wsj.outlet, "the-wall-street-journal");
        assert_eq!(config.sources.bbc.outlet, "bbc-news");
        assert_eq!(config.sources.bbc.language, "de");
        assert_eq!(config.sources.api_key_env(SourceKind::BbcNews), "NEWSAPI_KEY");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.fetch.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.fetch.timeout_secs = 10;
        assert!(config.validate().is_ok());

        config.sources.nyt.window.from = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        assert!(config.validate().is_err());
        config.sources.nyt.window.from = NaiveDate::from_ymd_opt(2018, 11, 1).unwrap();
        assert!(config.validate().is_ok());

        config.sources.youtube.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
