//! Error handling for feedcache core library

use std::fmt;
use thiserror::Error;

/// Result type alias for feedcache operations
pub type Result<T> = std::result::Result<T, FeedCacheError>;

/// Main error type for feedcache operations
///
/// Messages carried by these variants must never contain feed credentials;
/// callers render feed addresses through [`crate::feed::redact_source`].
#[derive(Error, Debug)]
pub enum FeedCacheError {
    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),

    /// Feed could not be retrieved (network failure or non-success status)
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// Feed body is not well-formed XML
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Feed structure no longer matches the flattening contract
    #[error("Shape error: {message}")]
    Shape { message: String },

    /// No snapshot has ever been loaded and the latest load failed
    #[error("Feed unavailable: {message}")]
    Unavailable { message: String },

    /// Query or id rejected before evaluation
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl FeedCacheError {
    /// Create a fetch error
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a shape error
    pub fn shape<S: Into<String>>(message: S) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create an invalid query error
    pub fn invalid_query<S: Into<String>>(message: S) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// Parse and shape failures are not retried immediately; they are picked
    /// up again on the next scheduled refresh.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Unavailable { .. } | Self::Io(_)
        )
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) => ErrorCategory::FileSystem,
            Self::Json(_) | Self::Yaml(_) => ErrorCategory::Serialization,
            Self::Config(_) | Self::Url(_) => ErrorCategory::Configuration,
            Self::Generic(_) => ErrorCategory::Generic,
            Self::Fetch { .. } => ErrorCategory::Network,
            Self::Parse { .. } => ErrorCategory::Parse,
            Self::Shape { .. } => ErrorCategory::Shape,
            Self::Unavailable { .. } => ErrorCategory::Unavailable,
            Self::InvalidQuery { .. } | Self::Validation { .. } => ErrorCategory::Validation,
        }
    }
}

/// Error categories for metrics and logging
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    FileSystem,
    Network,
    Serialization,
    Configuration,
    Parse,
    Shape,
    Unavailable,
    Validation,
    Generic,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileSystem => write!(f, "filesystem"),
            Self::Network => write!(f, "network"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
            Self::Parse => write!(f, "parse"),
            Self::Shape => write!(f, "shape"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Validation => write!(f, "validation"),
            Self::Generic => write!(f, "generic"),
        }
    }
}
