//! Search command implementation

use clap::Args;
use feedcache_core::{FeedCacheError, QueryEngine, Result};

use crate::commands::{build_engine, prepare, CliCommand};
use crate::config::CommandContext;
use crate::output::OutputFormatter;

/// Search the feed for records containing a text
#[derive(Debug, Clone, Args)]
pub struct SearchCommand {
    /// Text to search for (case-insensitive)
    pub query: String,

    /// Override the maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    #[arg(skip)]
    pub context: CommandContext,
}

impl SearchCommand {
    /// Run the search and write the results
    pub async fn run(&self, engine: &QueryEngine, out: &mut OutputFormatter) -> Result<()> {
        let mut response = engine.search(&self.query).await?;
        if let Some(limit) = self.limit {
            response.results.truncate(limit);
        }
        out.output(&response)
    }
}

impl CliCommand for SearchCommand {
    async fn execute(&self) -> Result<()> {
        let config = prepare(&self.context)?;
        let engine = build_engine(&config)?;
        let mut out = OutputFormatter::new(self.context.output);
        self.run(&engine, &mut out).await
    }

    fn name(&self) -> &'static str {
        "search"
    }

    fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(FeedCacheError::invalid_query("Query cannot be empty"));
        }
        if self.limit == Some(0) {
            return Err(FeedCacheError::validation("--limit must be at least 1"));
        }
        Ok(())
    }
}
