//! Configuration types for feedcache core library

use crate::{FeedCacheError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable prefix for configuration overrides
///
/// Keys are nested with a double underscore, for example
/// `FEEDCACHE__CACHE__TTL_SECONDS=120`.
pub const ENV_PREFIX: &str = "FEEDCACHE";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedCacheConfig {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: String,
    /// Remote feed settings
    #[serde(default)]
    pub feed: FeedConfig,
    /// Snapshot cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Ingest and query limits
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for FeedCacheConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            feed: FeedConfig::default(),
            cache: CacheConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Remote feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed address (`http`, `https` or `file`)
    #[serde(default = "default_feed_url")]
    pub url: Url,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// User agent sent with feed requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Candidate names of the repeating catalogue entry element, tried in order
    #[serde(default = "default_entry_elements")]
    pub entry_elements: Vec<String>,
    /// Flattened field names that carry a natural record id, tried in order
    #[serde(default = "default_id_fields")]
    pub id_fields: Vec<String>,
    /// Flattened field names used as the search result title, tried in order
    #[serde(default = "default_title_fields")]
    pub title_fields: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            entry_elements: default_entry_elements(),
            id_fields: default_id_fields(),
            title_fields: default_title_fields(),
        }
    }
}

impl FeedConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Snapshot cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum snapshot age before a refresh is attempted
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Minimum delay between refresh attempts after a failure while stale data exists
    #[serde(default = "default_failure_backoff")]
    pub failure_backoff_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            failure_backoff_seconds: default_failure_backoff(),
        }
    }
}

impl CacheConfig {
    /// Time-to-live as a duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Failure backoff as a duration
    pub fn failure_backoff(&self) -> Duration {
        Duration::from_secs(self.failure_backoff_seconds)
    }
}

/// Ingest and query limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of records kept per snapshot
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// Maximum number of search hits returned
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Maximum snippet length in characters
    #[serde(default = "default_snippet_length")]
    pub snippet_length: usize,
    /// Maximum accepted query length in characters
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            max_results: default_max_results(),
            snippet_length: default_snippet_length(),
            max_query_length: default_max_query_length(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (json, text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl FeedCacheConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // Try YAML first, then JSON
        match serde_yaml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(_) => {
                let config = serde_json::from_str(&content)?;
                Ok(config)
            }
        }
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration layered as defaults, optional file, then environment
    ///
    /// The file format is inferred from its extension. Environment overrides
    /// use [`ENV_PREFIX`] with `__` separators; list-valued keys accept
    /// comma-separated values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("feed.entry_elements")
            .with_list_parse_key("feed.id_fields")
            .with_list_parse_key("feed.title_fields");

        let config: Self = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.feed.url.scheme() {
            "http" | "https" | "file" => {}
            other => {
                return Err(FeedCacheError::validation(format!(
                    "Feed URL must use http, https or file scheme, got '{}'",
                    other
                )));
            }
        }

        if self.feed.timeout_seconds == 0 {
            return Err(FeedCacheError::validation("Feed timeout cannot be 0"));
        }

        if self.feed.entry_elements.iter().all(|e| e.trim().is_empty()) {
            return Err(FeedCacheError::validation(
                "At least one entry element name is required",
            ));
        }

        if self.limits.max_records == 0 {
            return Err(FeedCacheError::validation("max_records cannot be 0"));
        }

        if self.limits.max_results == 0 {
            return Err(FeedCacheError::validation("max_results cannot be 0"));
        }

        if self.limits.snippet_length == 0 {
            return Err(FeedCacheError::validation("snippet_length cannot be 0"));
        }

        if self.limits.max_query_length == 0 {
            return Err(FeedCacheError::validation("max_query_length cannot be 0"));
        }

        Ok(())
    }
}

// Default value functions
fn default_version() -> String {
    "1.0".to_string()
}
fn default_feed_url() -> Url {
    Url::parse("https://example.com/feed.xml").expect("static default feed URL is valid")
}
fn default_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("feedcache/{}", env!("CARGO_PKG_VERSION"))
}
fn default_entry_elements() -> Vec<String> {
    ["product", "item", "entry", "offer"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_id_fields() -> Vec<String> {
    ["id", "@id", "g:id", "sku", "product_id", "code"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_title_fields() -> Vec<String> {
    ["title", "name", "g:title", "product_name"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_ttl() -> u64 {
    600
}
fn default_failure_backoff() -> u64 {
    30
}
fn default_max_records() -> usize {
    5000
}
fn default_max_results() -> usize {
    20
}
fn default_snippet_length() -> usize {
    200
}
fn default_max_query_length() -> usize {
    256
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
