//! Common test helpers for engine integration tests

use async_trait::async_trait;
use feedcache_core::{FeedCacheError, FeedFetcher, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Catalogue with one well-known record
pub const RIOJA_CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog>
  <product>
    <id>42</id>
    <name>Rioja Reserva</name>
    <price currency="EUR">12.5</price>
  </product>
  <product>
    <id>43</id>
    <name>Ribera del Duero Crianza</name>
    <price currency="EUR">15</price>
  </product>
</catalog>"#;

/// Fetcher replaying a scripted list of outcomes
///
/// Once the script is exhausted the last outcome repeats.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    last: Mutex<Option<std::result::Result<String, String>>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl ScriptedFetcher {
    pub fn sequence(outcomes: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn always(body: &str) -> Self {
        Self::sequence(vec![Ok(body.to_string())])
    }

    pub fn with_delay_ms(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> std::result::Result<String, String> {
        let next = self.script.lock().pop_front();
        let mut last = self.last.lock();
        if let Some(outcome) = next {
            *last = Some(outcome);
        }
        last.clone()
            .unwrap_or_else(|| Err("fetcher has no scripted outcome".to_string()))
    }
}

#[async_trait]
impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.next_outcome().map_err(FeedCacheError::fetch)
    }

    fn source(&self) -> String {
        "https://feeds.example.com/catalog.xml".to_string()
    }
}
