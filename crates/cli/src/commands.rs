//! CLI commands module

use crate::config::CommandContext;
use feedcache_core::{FeedCacheConfig, QueryEngine, Result};
use feedcache_infra::{build_fetcher, init_logger, logger_config_from_env, LoggerConfig};
use std::sync::Arc;

pub mod fetch;
pub mod init;
pub mod search;
pub mod serve;
pub mod validate;

pub use fetch::*;
pub use init::*;
pub use search::*;
pub use serve::*;
pub use validate::*;

/// Base trait for CLI commands
#[allow(async_fn_in_trait)]
pub trait CliCommand {
    /// Execute the command
    async fn execute(&self) -> Result<()>;

    /// Get command name for logging
    fn name(&self) -> &'static str;

    /// Validate command arguments
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Common command execution wrapper
pub async fn execute_command<T: CliCommand>(command: T) -> Result<()> {
    tracing::debug!("Executing command: {}", command.name());

    command.validate()?;
    command.execute().await?;

    tracing::debug!("Command {} completed successfully", command.name());
    Ok(())
}

/// Load and validate the layered configuration, then install the logger
///
/// `--verbose` forces debug output; `FEEDCACHE_LOG_*` variables override the
/// configured logging section.
pub fn prepare(context: &CommandContext) -> Result<FeedCacheConfig> {
    let config = FeedCacheConfig::load(context.config_path.as_deref())?;
    config.validate()?;

    let mut logger = LoggerConfig::from(&config.logging);
    if context.verbose {
        logger.level = "debug".to_string();
    }
    // A subscriber may already be installed by the host process or a test.
    let _ = init_logger(logger_config_from_env(logger));

    Ok(config)
}

/// Build a query engine for the configured feed
pub fn build_engine(config: &FeedCacheConfig) -> Result<Arc<QueryEngine>> {
    let fetcher = build_fetcher(&config.feed)?;
    Ok(Arc::new(QueryEngine::from_fetcher(fetcher, config)))
}
