//! Serve command implementation

use clap::Args;
use feedcache_core::Result;
use feedcache_serve::{ServerBuilder, ServerConfig};

use crate::commands::{build_engine, prepare, CliCommand};
use crate::config::CommandContext;

/// Start the MCP/HTTP server
#[derive(Debug, Clone, Args)]
pub struct ServeCommand {
    /// Host address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, env = "PORT", default_value_t = feedcache_serve::DEFAULT_PORT)]
    pub port: u16,

    /// Disable CORS headers
    #[arg(long)]
    pub no_cors: bool,

    /// Maximum request body size in bytes
    #[arg(long, default_value = "1048576")]
    pub max_body_size: usize,

    /// Load the feed before accepting requests
    #[arg(long)]
    pub warm: bool,

    #[arg(skip)]
    pub context: CommandContext,
}

impl ServeCommand {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            cors_enabled: !self.no_cors,
            max_request_size: self.max_body_size,
        }
    }
}

impl CliCommand for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let config = prepare(&self.context)?;
        let engine = build_engine(&config)?;

        tracing::info!("Serving feed {}", engine.source());

        if self.warm {
            match engine.ensure_fresh().await {
                Ok(snapshot) => tracing::info!("Warm cache holds {} records", snapshot.len()),
                Err(e) => tracing::warn!("Initial feed load failed: {}", e),
            }
        }

        let server_config = self.server_config();
        ServerBuilder::new()
            .host(server_config.host)
            .port(server_config.port)
            .cors(server_config.cors_enabled)
            .max_request_size(server_config.max_request_size)
            .build(engine)
            .start()
            .await
    }

    fn name(&self) -> &'static str {
        "serve"
    }
}
