//! Query engine over the cached feed snapshot
//!
//! The engine keeps the snapshot fresh on demand and answers `search` and
//! `fetch_by_id`. Refreshes are single-flight: concurrent callers that find
//! the cache stale wait for the one loader run and reuse its outcome.

use crate::cache::{CacheState, CacheStats, CacheStatus};
use crate::config::{FeedCacheConfig, LimitsConfig};
use crate::feed::{FeedFetcher, FeedLoader};
use crate::query::{FetchOutcome, FetchedRecord, SearchHit, SearchResponse};
use crate::types::Snapshot;
use crate::{FeedCacheError, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Search and lookup over a time-bounded feed cache
#[derive(Debug)]
pub struct QueryEngine {
    loader: FeedLoader,
    state: Arc<CacheState>,
    failure_backoff: Duration,
    title_fields: Vec<String>,
    limits: LimitsConfig,
}

impl QueryEngine {
    /// Create an engine with its own empty cache
    pub fn new(loader: FeedLoader, config: &FeedCacheConfig) -> Self {
        let state = Arc::new(CacheState::new(config.cache.ttl()));
        Self::with_state(loader, config, state)
    }

    /// Create an engine over an existing cache state
    pub fn with_state(loader: FeedLoader, config: &FeedCacheConfig, state: Arc<CacheState>) -> Self {
        Self {
            loader,
            state,
            failure_backoff: config.cache.failure_backoff(),
            title_fields: config.feed.title_fields.clone(),
            limits: config.limits.clone(),
        }
    }

    /// Create an engine reading from `fetcher`
    pub fn from_fetcher(fetcher: Arc<dyn FeedFetcher>, config: &FeedCacheConfig) -> Self {
        Self::new(FeedLoader::new(fetcher, config), config)
    }

    /// Shared cache state
    pub fn state(&self) -> &Arc<CacheState> {
        &self.state
    }

    /// Credential-free feed source
    pub fn source(&self) -> String {
        self.loader.source()
    }

    /// Current cache freshness
    pub fn status(&self) -> CacheStatus {
        self.state.status()
    }

    /// Cache metrics for health reporting
    pub fn stats(&self) -> CacheStats {
        self.state.stats()
    }

    /// Return a snapshot no older than the TTL, loading one if needed
    ///
    /// When loading fails the previous snapshot is served; only a cache that
    /// never loaded successfully yields [`FeedCacheError::Unavailable`].
    pub async fn ensure_fresh(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.state.fresh() {
            return Ok(snapshot);
        }

        if let Some(stale) = self.backing_off() {
            return Ok(stale);
        }

        let observed = self.state.generation();
        let _guard = self.state.lock_refresh().await;

        if self.state.generation() != observed {
            return self.settled();
        }

        // A refresh may have completed between the first check and `observed`.
        if let Some(snapshot) = self.state.fresh() {
            return Ok(snapshot);
        }
        if let Some(stale) = self.backing_off() {
            return Ok(stale);
        }

        self.reload().await
    }

    /// Reload the feed regardless of snapshot age
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        let observed = self.state.generation();
        let _guard = self.state.lock_refresh().await;

        if self.state.generation() != observed {
            return self.settled();
        }

        self.reload().await
    }

    /// Case-insensitive substring search over record values
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FeedCacheError::invalid_query("Query cannot be empty"));
        }
        if query.chars().count() > self.limits.max_query_length {
            return Err(FeedCacheError::invalid_query(format!(
                "Query exceeds {} characters",
                self.limits.max_query_length
            )));
        }

        let snapshot = self.ensure_fresh().await?;
        let started = Instant::now();
        let needle = query.to_lowercase();

        let results: Vec<SearchHit> = snapshot
            .matching(&needle)
            .take(self.limits.max_results)
            .map(|record| {
                SearchHit::from_record(record, &self.title_fields, self.limits.snippet_length)
            })
            .collect();

        debug!(
            "Search '{}' matched {} records in {:?}",
            query,
            results.len(),
            started.elapsed()
        );

        Ok(SearchResponse { results })
    }

    /// Resolve a record by id
    pub async fn fetch_by_id(&self, id: &str) -> Result<FetchOutcome> {
        let id = id.trim();
        if id.is_empty() {
            return Err(FeedCacheError::invalid_query("Id cannot be empty"));
        }

        let snapshot = self.ensure_fresh().await?;
        let outcome = match snapshot.get(id) {
            Some(record) => FetchOutcome::Found(FetchedRecord::from_record(record, snapshot.source())),
            None => {
                debug!("Record '{}' not found", id);
                FetchOutcome::NotFound { id: id.to_string() }
            }
        };

        Ok(outcome)
    }

    /// Stale snapshot to serve while a recent failure is backing off
    fn backing_off(&self) -> Option<Arc<Snapshot>> {
        let age = self.state.last_failure_age()?;
        if age >= self.failure_backoff {
            return None;
        }
        let stale = self.state.current()?;
        debug!(
            "Serving stale snapshot; last refresh failed {:?} ago",
            age
        );
        Some(stale)
    }

    /// Outcome of a refresh that completed while this caller waited
    fn settled(&self) -> Result<Arc<Snapshot>> {
        self.state.current().ok_or_else(|| {
            FeedCacheError::unavailable(
                self.state
                    .last_error()
                    .unwrap_or_else(|| "feed has not been loaded".to_string()),
            )
        })
    }

    async fn reload(&self) -> Result<Arc<Snapshot>> {
        match self.loader.load().await {
            Ok(snapshot) => {
                if snapshot.is_truncated() {
                    info!(
                        "Snapshot truncated to {} of {} entries",
                        snapshot.len(),
                        snapshot.total_entries()
                    );
                }
                Ok(self.state.install(snapshot))
            }
            Err(e) => {
                let message = e.to_string();
                self.state.record_failure(message.clone());
                match self.state.current() {
                    Some(stale) => {
                        warn!(
                            category = %e.category(),
                            "Feed refresh failed, serving stale snapshot from {}: {}",
                            stale.created_at(),
                            message
                        );
                        Ok(stale)
                    }
                    None => {
                        error!(category = %e.category(), "Feed load failed: {}", message);
                        Err(FeedCacheError::unavailable(message))
                    }
                }
            }
        }
    }
}
