//! CLI configuration module

use feedcache_core::{FeedCacheError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Pretty,
    Compact,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Pretty => write!(f, "pretty"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FeedCacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            _ => Err(FeedCacheError::validation(format!(
                "Invalid output format: {}",
                s
            ))),
        }
    }
}

/// Global options shared by every command
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Configuration file given with `--config`
    pub config_path: Option<PathBuf>,
    /// Output format given with `--output`
    pub output: OutputFormat,
    /// Whether `--verbose` was given
    pub verbose: bool,
}

/// Check if the terminal supports colors
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false)
}
