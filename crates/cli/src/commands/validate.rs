//! Validate command implementation

use clap::Args;
use feedcache_core::{FeedCacheConfig, QueryEngine, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::commands::{build_engine, prepare, CliCommand};
use crate::config::CommandContext;
use crate::output::OutputFormatter;

/// Check the configuration and optionally load the feed once
#[derive(Debug, Clone, Args)]
pub struct ValidateCommand {
    /// Configuration file to validate (defaults to `--config`)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Also fetch and flatten the feed
    #[arg(long)]
    pub probe: bool,

    #[arg(skip)]
    pub context: CommandContext,
}

/// Summary printed by `validate`
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub feed: String,
    pub ttl_seconds: u64,
    pub max_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_entries: Option<usize>,
}

impl ValidationReport {
    /// Message for a probe that hit the ingest cap
    pub fn truncation_warning(&self) -> Option<String> {
        match (self.records, self.total_entries) {
            (Some(records), Some(total)) if total > records => Some(format!(
                "Feed has {} entries but only the first {} are kept (limits.max_records)",
                total, records
            )),
            _ => None,
        }
    }
}

impl ValidateCommand {
    /// Build the report, loading the feed when probing
    pub async fn report(&self, config: &FeedCacheConfig, engine: &QueryEngine) -> Result<ValidationReport> {
        let mut report = ValidationReport {
            feed: engine.source(),
            ttl_seconds: config.cache.ttl_seconds,
            max_records: config.limits.max_records,
            records: None,
            total_entries: None,
        };

        if self.probe {
            let snapshot = engine.refresh().await?;
            report.records = Some(snapshot.len());
            report.total_entries = Some(snapshot.total_entries());
        }

        Ok(report)
    }
}

impl CliCommand for ValidateCommand {
    async fn execute(&self) -> Result<()> {
        let mut context = self.context.clone();
        if self.file.is_some() {
            context.config_path = self.file.clone();
        }

        let config = prepare(&context)?;
        let engine = build_engine(&config)?;
        let report = self.report(&config, &engine).await?;

        let mut out = OutputFormatter::new(context.output);
        out.output(&report)?;
        if let Some(warning) = report.truncation_warning() {
            out.warning(&warning)?;
        }
        out.success("Configuration is valid")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "validate"
    }
}
