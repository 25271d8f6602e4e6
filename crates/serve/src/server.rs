//! Server module for feedcache serve crate

use crate::handlers::{create_routes, AppState};
use crate::ServerConfig;
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, Method,
    },
    Router,
};
use feedcache_core::{FeedCacheError, QueryEngine, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// feedcache HTTP server
pub struct FeedCacheServer {
    config: ServerConfig,
    app: Router,
}

impl FeedCacheServer {
    /// Create a new server instance around a query engine
    pub fn new(config: ServerConfig, engine: Arc<QueryEngine>) -> Self {
        let app = create_app(&config, AppState::new(engine));
        Self { config, app }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| FeedCacheError::validation(format!("Invalid address {}: {}", addr, e)))?;

        let listener = tokio::net::TcpListener::bind(socket_addr).await.map_err(|e| {
            FeedCacheError::Generic(anyhow::anyhow!("Failed to bind to {}: {}", addr, e))
        })?;

        tracing::info!("feedcache MCP endpoint on http://{}/api/mcp", addr);

        axum::serve(listener, self.app)
            .await
            .map_err(|e| FeedCacheError::Generic(anyhow::anyhow!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The assembled router
    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

/// Create the Axum application with middleware
pub fn create_app(config: &ServerConfig, state: AppState) -> Router {
    let mut app = create_routes().with_state(state);

    app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(config.max_request_size)),
    );

    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                ACCEPT,
                CONTENT_TYPE,
                HeaderName::from_static("mcp-protocol-version"),
            ]);

        app = app.layer(cors);
    }

    app
}

/// Server builder for configuration
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Set the host address
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.config.cors_enabled = enabled;
        self
    }

    /// Set maximum request size
    pub fn max_request_size(mut self, size: usize) -> Self {
        self.config.max_request_size = size;
        self
    }

    /// Build the server around a query engine
    pub fn build(self, engine: Arc<QueryEngine>) -> FeedCacheServer {
        FeedCacheServer::new(self.config, engine)
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedcache_core::{FeedCacheConfig, StaticFetcher};

    #[test]
    fn test_server_builder() {
        let engine = Arc::new(QueryEngine::from_fetcher(
            Arc::new(StaticFetcher::new("<c/>")),
            &FeedCacheConfig::default(),
        ));

        let server = ServerBuilder::new()
            .host("127.0.0.1")
            .port(8080)
            .cors(false)
            .max_request_size(5 * 1024 * 1024)
            .build(engine);

        assert_eq!(server.config().host, "127.0.0.1");
        assert_eq!(server.config().port, 8080);
        assert!(!server.config().cors_enabled);
        assert_eq!(server.config().max_request_size, 5 * 1024 * 1024);
    }
}
