//! HTTP feed fetcher backed by reqwest

use async_trait::async_trait;
use feedcache_core::{decode_feed, redact_source, FeedCacheError, FeedConfig, FeedFetcher, Result};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    pub url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl From<&FeedConfig> for HttpFetcherConfig {
    fn from(config: &FeedConfig) -> Self {
        Self {
            url: config.url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Fetches the feed body with a GET request
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    config: HttpFetcherConfig,
    source: String,
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    /// Create a new HTTP fetcher
    pub fn new(config: HttpFetcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                FeedCacheError::fetch(format!("Failed to build HTTP client: {}", e.without_url()))
            })?;

        Ok(Self {
            source: redact_source(&config.url),
            config,
            client,
        })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self) -> Result<String> {
        tracing::debug!("Requesting feed from {}", self.source);

        let response = self
            .client
            .get(self.config.url.clone())
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                FeedCacheError::fetch(format!(
                    "Request to {} {}: {}",
                    self.source,
                    kind,
                    e.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedCacheError::fetch(format!(
                "Feed {} returned status {}",
                self.source, status
            )));
        }

        let read_error = |e: reqwest::Error| {
            FeedCacheError::fetch(format!(
                "Failed to read feed body from {}: {}",
                self.source,
                e.without_url()
            ))
        };

        // A charset in the Content-Type header overrides the XML declaration.
        if declares_charset(&response) {
            return response.text().await.map_err(read_error);
        }

        let bytes = response.bytes().await.map_err(read_error)?;
        decode_feed(&bytes)
    }

    fn source(&self) -> String {
        self.source.clone()
    }
}

fn declares_charset(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("charset="))
        .unwrap_or(false)
}
