//! feedcache Serve Library
//!
//! HTTP interface for feedcache: a JSON-RPC MCP endpoint exposing the
//! `search` and `fetch` tools, REST mirrors of both and a health check.

pub mod handlers;
pub mod mcp;
pub mod server;

pub use handlers::*;
pub use server::*;

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listening port
pub const DEFAULT_PORT: u16 = 10000;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_enabled: true,
            max_request_size: 1024 * 1024, // 1MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 10000);
        assert!(config.cors_enabled);
    }
}
