//! Local file feed fetcher

use async_trait::async_trait;
use feedcache_core::{decode_feed, FeedCacheError, FeedFetcher, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;

/// Reads the feed body from a local file
#[derive(Debug, Clone)]
pub struct FileFeedFetcher {
    path: PathBuf,
}

impl FileFeedFetcher {
    /// Create a fetcher for a filesystem path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a fetcher from a `file://` URL
    pub fn from_url(url: &Url) -> Result<Self> {
        let path = url.to_file_path().map_err(|_| {
            FeedCacheError::validation(format!("Not a local file URL: {}", url))
        })?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FeedFetcher for FileFeedFetcher {
    async fn fetch(&self) -> Result<String> {
        let bytes = fs::read(&self.path).await.map_err(|e| {
            FeedCacheError::fetch(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        decode_feed(&bytes)
    }

    fn source(&self) -> String {
        Url::from_file_path(&self.path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| self.path.display().to_string())
    }
}
