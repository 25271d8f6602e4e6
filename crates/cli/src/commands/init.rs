//! Init command implementation

use clap::Args;
use feedcache_core::{FeedCacheConfig, FeedCacheError, Result};
use std::path::PathBuf;
use url::Url;

use crate::commands::CliCommand;
use crate::config::CommandContext;
use crate::output::OutputFormatter;

/// Write a configuration file with default settings
#[derive(Debug, Clone, Args)]
pub struct InitCommand {
    /// Where to write the configuration
    #[arg(short, long, default_value = "feedcache.yaml")]
    pub path: PathBuf,

    /// Feed URL to put in the configuration
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,

    #[arg(skip)]
    pub context: CommandContext,
}

impl InitCommand {
    fn build_config(&self) -> Result<FeedCacheConfig> {
        let mut config = FeedCacheConfig::default();
        if let Some(url) = &self.feed_url {
            config.feed.url = Url::parse(url)?;
        }
        config.validate()?;
        Ok(config)
    }
}

impl CliCommand for InitCommand {
    async fn execute(&self) -> Result<()> {
        let config = self.build_config()?;
        config.to_file(&self.path)?;

        let mut out = OutputFormatter::new(self.context.output);
        out.success(&format!("Configuration written to {}", self.path.display()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "init"
    }

    fn validate(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            return Err(FeedCacheError::validation(format!(
                "{} already exists. Use --force to overwrite.",
                self.path.display()
            )));
        }
        Ok(())
    }
}
