//! Fetch command implementation

use clap::Args;
use feedcache_core::{FeedCacheError, FetchOutcome, QueryEngine, Result};
use serde_json::json;

use crate::commands::{build_engine, prepare, CliCommand};
use crate::config::CommandContext;
use crate::output::OutputFormatter;

/// Print one record by id
#[derive(Debug, Clone, Args)]
pub struct FetchCommand {
    /// Record id, as returned by `search`
    pub id: String,

    #[arg(skip)]
    pub context: CommandContext,
}

impl FetchCommand {
    /// Resolve the record and write it; returns whether it was found
    pub async fn run(&self, engine: &QueryEngine, out: &mut OutputFormatter) -> Result<bool> {
        match engine.fetch_by_id(&self.id).await? {
            FetchOutcome::Found(record) => {
                out.output(&record)?;
                Ok(true)
            }
            FetchOutcome::NotFound { id } => {
                out.output(&json!({ "error": "Not found", "id": id }))?;
                Ok(false)
            }
        }
    }
}

impl CliCommand for FetchCommand {
    async fn execute(&self) -> Result<()> {
        let config = prepare(&self.context)?;
        let engine = build_engine(&config)?;
        let mut out = OutputFormatter::new(self.context.output);

        if !self.run(&engine, &mut out).await? {
            return Err(FeedCacheError::validation(format!(
                "No record with id '{}'",
                self.id.trim()
            )));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fetch"
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(FeedCacheError::invalid_query("Id cannot be empty"));
        }
        Ok(())
    }
}
