//! Logging infrastructure for feedcache
//!
//! Centralized `tracing-subscriber` setup shared by the CLI and the server.
//! Log lines go to stderr; stdout is reserved for command output.

use feedcache_core::{FeedCacheError, LoggingConfig, Result};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to use JSON format
    pub json_format: bool,
    /// Whether to include timestamps
    pub with_timestamps: bool,
    /// Whether to include file/line information
    pub with_file_info: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamps: true,
            with_file_info: false,
        }
    }
}

impl From<&LoggingConfig> for LoggerConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            json_format: config.format.eq_ignore_ascii_case("json"),
            ..Default::default()
        }
    }
}

/// Initialize the global logger with the given configuration
pub fn init_logger(config: LoggerConfig) -> Result<()> {
    let level = LogLevel::parse(&config.level)?;

    let mut env_filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn", "h2=warn"] {
        let directive = directive
            .parse::<Directive>()
            .map_err(|e| FeedCacheError::validation(format!("Invalid log directive: {}", e)))?;
        env_filter = env_filter.add_directive(directive);
    }

    let fmt_layer = if config.json_format {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info)
            .boxed()
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info);

        if config.with_timestamps {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| FeedCacheError::validation(format!("Failed to initialize logger: {}", e)))?;

    tracing::debug!("Logger initialized with level: {}", config.level);
    Ok(())
}

/// Create a logger configuration from `FEEDCACHE_LOG_*` environment variables
///
/// Variables that are unset fall back to `base`.
pub fn logger_config_from_env(base: LoggerConfig) -> LoggerConfig {
    fn flag(name: &str, default: bool) -> bool {
        std::env::var(name)
            .map(|v| v.parse().unwrap_or(default))
            .unwrap_or(default)
    }

    LoggerConfig {
        level: std::env::var("FEEDCACHE_LOG_LEVEL").unwrap_or(base.level),
        json_format: flag("FEEDCACHE_LOG_JSON", base.json_format),
        with_timestamps: flag("FEEDCACHE_LOG_TIMESTAMPS", base.with_timestamps),
        with_file_info: flag("FEEDCACHE_LOG_FILE_INFO", base.with_file_info),
    }
}

/// Log level utilities
pub struct LogLevel;

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level: &str) -> Result<Level> {
        Level::from_str(level).map_err(|e| {
            FeedCacheError::validation(format!("Invalid log level '{}': {}", level, e))
        })
    }
}
