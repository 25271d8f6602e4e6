//! feedcache - cached search and lookup over remote XML product catalogues
//!
//! The binary fetches a catalogue feed, flattens its entries into records and
//! answers text searches and id lookups from a TTL cache, either one-shot from
//! the command line or through the MCP/HTTP server.

use clap::{CommandFactory, Parser, Subcommand};
use feedcache_cli::{
    execute_command, CommandContext, FetchCommand, InitCommand, OutputFormat, SearchCommand,
    ServeCommand, ValidateCommand,
};
use feedcache_core::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "feedcache")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cached search and lookup over a remote XML product catalogue")]
#[command(long_about = r#"
feedcache downloads an XML catalogue feed, flattens every entry into a record
and keeps the result in memory for a configurable TTL. When the feed cannot be
refreshed the previous snapshot keeps being served.

Records can be searched and fetched from the command line, or exposed to MCP
clients with `feedcache serve`.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FEEDCACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (json, yaml, pretty, compact)
    #[arg(short, long, default_value = "pretty", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP/HTTP server
    Serve(ServeCommand),

    /// Search records by text
    Search(SearchCommand),

    /// Fetch one record by id
    Fetch(FetchCommand),

    /// Write a default configuration file
    Init(InitCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CommandContext {
        config_path: cli.config.clone(),
        output: cli.output,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Serve(mut cmd)) => {
            cmd.context = context;
            execute_command(cmd).await
        }
        Some(Commands::Search(mut cmd)) => {
            cmd.context = context;
            execute_command(cmd).await
        }
        Some(Commands::Fetch(mut cmd)) => {
            cmd.context = context;
            execute_command(cmd).await
        }
        Some(Commands::Init(mut cmd)) => {
            cmd.context = context;
            execute_command(cmd).await
        }
        Some(Commands::Validate(mut cmd)) => {
            cmd.context = context;
            execute_command(cmd).await
        }
        Some(Commands::Version) => {
            println!("{}", feedcache_core::version_info());
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_reaches_every_subcommand() {
        for args in [
            vec!["feedcache", "validate", "--config", "x.yaml"],
            vec!["feedcache", "search", "rioja", "--config", "x.yaml"],
            vec!["feedcache", "--config", "x.yaml", "fetch", "42"],
        ] {
            let cli = Cli::try_parse_from(args.clone()).unwrap();
            assert_eq!(cli.config, Some(PathBuf::from("x.yaml")), "{:?}", args);
        }
    }

    #[test]
    fn test_validate_takes_file_argument() {
        let cli =
            Cli::try_parse_from(["feedcache", "validate", "other.yaml", "--config", "x.yaml"])
                .unwrap();
        match cli.command {
            Some(Commands::Validate(cmd)) => {
                assert_eq!(cmd.file, Some(PathBuf::from("other.yaml")));
                assert!(!cmd.probe);
            }
            _ => panic!("expected validate"),
        }
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
    }

    #[test]
    fn test_serve_port_from_env() {
        std::env::set_var("PORT", "8123");
        let cli = Cli::try_parse_from(["feedcache", "serve"]).unwrap();
        std::env::remove_var("PORT");

        match cli.command {
            Some(Commands::Serve(cmd)) => {
                assert_eq!(cmd.port, 8123);
                assert_eq!(cmd.host, "0.0.0.0");
            }
            _ => panic!("expected serve"),
        }

        let cli = Cli::try_parse_from(["feedcache", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Some(Commands::Serve(cmd)) => assert_eq!(cmd.port, 9000),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_output_format_parsing() {
        let cli = Cli::try_parse_from(["feedcache", "-o", "compact", "version"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Compact);
        assert!(Cli::try_parse_from(["feedcache", "-o", "xml", "version"]).is_err());
    }
}
