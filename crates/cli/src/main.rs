//! Switchyard CLI: the main entry point.
//!
//! Commands:
//! - `chat`    Single message or line-by-line stdin conversation
//! - `demo`    Run the canonical routing scenarios
//! - `tools`   List available tools
//! - `memory`  Search, list and prune long-term memory
//! - `config`  Print the default configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use switchyard_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "switchyard",
    about = "Switchyard: tool-routing conversational pipeline",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs and results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file to load instead of ~/.switchyard/config.toml
    #[arg(short, long, global = true, env = "SWITCHYARD_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the pipeline
    Chat {
        /// Send a single message instead of reading stdin
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Run the canonical scenarios against a fresh pipeline
    Demo,

    /// List available tools
    Tools,

    /// Long-term memory management
    Memory {
        #[command(subcommand)]
        action: MemoryCommands,
    },

    /// Print the default configuration
    Config,
}

#[derive(Subcommand)]
enum MemoryCommands {
    /// Relevance search over stored conversations
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only consider the last N days
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Most recent stored conversations
    Recent {
        #[arg(short, long, default_value_t = 5)]
        count: usize,
    },

    /// Delete one stored conversation
    Forget { id: String },

    /// Delete every stored conversation in the namespace
    Clear {
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json);

    if let Commands::Config = cli.command {
        commands::config_cmd::show();
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;
    tracing::debug!(
        backend = ?config.memory.backend,
        namespace = %config.memory.namespace,
        router = ?config.router.strategy,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Chat { message } => commands::chat::run(&config, message, cli.json).await?,
        Commands::Demo => commands::demo::run(&config, cli.json).await?,
        Commands::Tools => commands::tools::run(&config, cli.json).await?,
        Commands::Memory { action } => match action {
            MemoryCommands::Search { query, limit, days } => {
                commands::memory::search(&config, &query, limit, days, cli.json).await?
            }
            MemoryCommands::Recent { count } => {
                commands::memory::recent(&config, count, cli.json).await?
            }
            MemoryCommands::Forget { id } => commands::memory::forget(&config, &id).await?,
            MemoryCommands::Clear { confirm } => commands::memory::clear(&config, confirm).await?,
        },
        Commands::Config => {}
    }

    Ok(())
}

/// `RUST_LOG` wins over `--verbose`. Logs go to stderr so stdout stays clean.
fn init_tracing(verbose: bool, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter(verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}
