//! feedcache Infrastructure Library
//!
//! Infrastructure components for feedcache: the HTTP and file feed
//! fetchers and the logging setup.

use feedcache_core::{FeedCacheError, FeedConfig, FeedFetcher, Result};
use std::sync::Arc;

pub mod file;
pub mod http;
pub mod logger;

pub use file::*;
pub use http::*;
pub use logger::*;

/// Infrastructure version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the fetcher matching the feed URL scheme
pub fn build_fetcher(config: &FeedConfig) -> Result<Arc<dyn FeedFetcher>> {
    match config.url.scheme() {
        "http" | "https" => Ok(Arc::new(HttpFeedFetcher::new(HttpFetcherConfig::from(
            config,
        ))?)),
        "file" => Ok(Arc::new(FileFeedFetcher::from_url(&config.url)?)),
        other => Err(FeedCacheError::validation(format!(
            "Unsupported feed URL scheme '{}'",
            other
        ))),
    }
}
