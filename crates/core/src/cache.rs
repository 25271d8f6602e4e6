//! Snapshot cache state
//!
//! [`CacheState`] owns at most one live snapshot and the bookkeeping needed
//! to coordinate refreshes. Readers only ever clone the `Arc` under a short
//! read lock; a refresh swaps the pointer in one write.

use crate::types::Snapshot;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};

/// Freshness of the cached snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// No snapshot has been loaded yet
    Empty,
    /// Snapshot is younger than the TTL
    Fresh,
    /// Snapshot has outlived the TTL
    Stale,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Fresh => write!(f, "fresh"),
            Self::Stale => write!(f, "stale"),
        }
    }
}

/// Point-in-time view of the cache for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub status: CacheStatus,
    pub records: usize,
    pub total_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<u64>,
    pub ttl_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub refreshes: u64,
    pub failures: u64,
}

#[derive(Debug, Clone)]
struct CachedSnapshot {
    snapshot: Arc<Snapshot>,
    loaded_at: Instant,
}

#[derive(Debug, Clone)]
struct Failure {
    message: String,
    at: Instant,
}

/// Holder of the live snapshot and its refresh bookkeeping
#[derive(Debug)]
pub struct CacheState {
    ttl: Duration,
    current: RwLock<Option<CachedSnapshot>>,
    last_failure: RwLock<Option<Failure>>,
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
    refreshes: AtomicU64,
    failures: AtomicU64,
}

impl CacheState {
    /// Create an empty cache with the given time-to-live
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: RwLock::new(None),
            last_failure: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The live snapshot regardless of age
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().as_ref().map(|c| Arc::clone(&c.snapshot))
    }

    /// The live snapshot if it is younger than the TTL
    pub fn fresh(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .as_ref()
            .filter(|c| c.loaded_at.elapsed() < self.ttl)
            .map(|c| Arc::clone(&c.snapshot))
    }

    /// Current freshness
    pub fn status(&self) -> CacheStatus {
        match self.current.read().as_ref() {
            None => CacheStatus::Empty,
            Some(c) if c.loaded_at.elapsed() < self.ttl => CacheStatus::Fresh,
            Some(_) => CacheStatus::Stale,
        }
    }

    /// Replace the live snapshot and clear any recorded failure
    pub fn install(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(CachedSnapshot {
            snapshot: Arc::clone(&snapshot),
            loaded_at: Instant::now(),
        });
        *self.last_failure.write() = None;
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::AcqRel);
        snapshot
    }

    /// Record a failed refresh attempt
    pub fn record_failure<S: Into<String>>(&self, message: S) {
        *self.last_failure.write() = Some(Failure {
            message: message.into(),
            at: Instant::now(),
        });
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of completed refresh attempts, successful or not
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Message of the most recent failure, if the last attempt failed
    pub fn last_error(&self) -> Option<String> {
        self.last_failure.read().as_ref().map(|f| f.message.clone())
    }

    /// Time since the most recent failure, if the last attempt failed
    pub fn last_failure_age(&self) -> Option<Duration> {
        self.last_failure.read().as_ref().map(|f| f.at.elapsed())
    }

    /// Wait for exclusive permission to run the loader
    pub async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_lock.lock().await
    }

    /// Snapshot of cache metrics
    pub fn stats(&self) -> CacheStats {
        let current = self.current.read().clone();
        let status = self.status();

        CacheStats {
            status,
            records: current.as_ref().map_or(0, |c| c.snapshot.len()),
            total_entries: current.as_ref().map_or(0, |c| c.snapshot.total_entries()),
            source: current.as_ref().map(|c| c.snapshot.source().to_string()),
            created_at: current.as_ref().map(|c| c.snapshot.created_at()),
            age_seconds: current.as_ref().map(|c| c.loaded_at.elapsed().as_secs()),
            ttl_seconds: self.ttl.as_secs(),
            last_error: self.last_error(),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
