//! feedcache Core Library
//!
//! Core functionality for feedcache: a time-bounded cache over a remote XML
//! product catalogue. The feed is fetched on demand, flattened into records
//! with stable ids and served through substring search and id lookup.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod query;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheState, CacheStats, CacheStatus};
pub use config::{CacheConfig, FeedCacheConfig, FeedConfig, LimitsConfig, LoggingConfig};
pub use engine::QueryEngine;
pub use error::{ErrorCategory, FeedCacheError, Result};
pub use feed::{decode_feed, redact_source, FeedFetcher, FeedLoader, StaticFetcher};
pub use query::{FetchOutcome, FetchedRecord, RecordMetadata, SearchHit, SearchResponse};
pub use types::{FieldValue, Record, Snapshot};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version info as a formatted string
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
