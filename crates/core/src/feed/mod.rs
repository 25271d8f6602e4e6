//! Feed loading: fetch, parse and flatten a remote catalogue into a snapshot

pub mod document;
pub mod fetcher;
pub mod flatten;

pub use document::{decode_feed, RawDocument, XmlNode};
pub use fetcher::{redact_source, FeedFetcher, StaticFetcher};
pub use flatten::{build_snapshot, flatten_entry, locate_entries, FlattenSettings};

use crate::config::FeedCacheConfig;
use crate::types::Snapshot;
use crate::{FeedCacheError, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Produces fresh snapshots from the configured feed source
#[derive(Clone)]
pub struct FeedLoader {
    fetcher: Arc<dyn FeedFetcher>,
    settings: FlattenSettings,
}

impl std::fmt::Debug for FeedLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedLoader")
            .field("source", &self.fetcher.source())
            .field("settings", &self.settings)
            .finish()
    }
}

impl FeedLoader {
    /// Create a loader from a fetcher and the feed/limits configuration
    pub fn new(fetcher: Arc<dyn FeedFetcher>, config: &FeedCacheConfig) -> Self {
        Self {
            fetcher,
            settings: FlattenSettings {
                entry_elements: config.feed.entry_elements.clone(),
                id_fields: config.feed.id_fields.clone(),
                max_records: config.limits.max_records,
            },
        }
    }

    /// Credential-free source description
    pub fn source(&self) -> String {
        self.fetcher.source()
    }

    /// Fetch the feed and build a new snapshot
    ///
    /// Parsing and flattening run on the blocking pool.
    pub async fn load(&self) -> Result<Snapshot> {
        let source = self.fetcher.source();
        let started = Instant::now();

        let body = self.fetcher.fetch().await?;
        let fetched_in = started.elapsed();
        debug!("Fetched {} bytes from {} in {:?}", body.len(), source, fetched_in);

        let settings = self.settings.clone();
        let task_source = source.clone();
        let snapshot = tokio::task::spawn_blocking(move || {
            Self::build_snapshot(&body, &settings, &task_source)
        })
        .await
        .map_err(|e| FeedCacheError::Generic(anyhow::anyhow!("flatten task failed: {}", e)))??;

        info!(
            "Loaded {} records from {} (fetch {:?}, total {:?})",
            snapshot.len(),
            source,
            fetched_in,
            started.elapsed()
        );

        Ok(snapshot)
    }

    /// Parse and flatten a feed body synchronously
    pub fn build_snapshot(body: &str, settings: &FlattenSettings, source: &str) -> Result<Snapshot> {
        let document = RawDocument::parse(body)?;
        build_snapshot(&document, settings, source)
    }
}
