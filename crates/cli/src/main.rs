//! Dossier CLI
//!
//! Main entry point for the dossier command-line tool.
//! Answers questions from a document collection with cited sources.

mod commands;
mod ingest;

use clap::{Parser, Subcommand};
use commands::{AskCommand, DocsCommand, SummarizeCommand};
use dossier_core::{config::AppConfig, logging, AppError, AppResult};
use dossier_llm::{create_client, GenerationClient, ResilientClient, RetryPolicy};
use std::path::PathBuf;
use std::sync::Arc;

/// Dossier CLI - document-grounded Q&A with cited sources
#[derive(Parser, Debug)]
#[command(name = "dossier")]
#[command(about = "Document-grounded Q&A with cited sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "DOSSIER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generation service provider (gemini, mock)
    #[arg(short, long, global = true, env = "DOSSIER_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "DOSSIER_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question against a document collection
    Ask(AskCommand),

    /// Summarize a document collection and extract entities
    Summarize(SummarizeCommand),

    /// List a document collection with enriched descriptions
    Docs(DocsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Dossier CLI starting");
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    // A missing API key or unknown provider is fatal here, before any work
    config.validate()?;

    let base_client = create_client(
        &config.provider,
        config.endpoint.as_deref(),
        config.api_key.as_deref(),
    )
    .map_err(AppError::Config)?;

    // Every external call goes through the retry decorator
    let client: Arc<dyn GenerationClient> = Arc::new(ResilientClient::new(
        base_client,
        RetryPolicy::from(&config.retry),
    ));

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Summarize(_) => "summarize",
        Commands::Docs(_) => "docs",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config, client).await,
        Commands::Summarize(cmd) => cmd.execute(&config, client).await,
        Commands::Docs(cmd) => cmd.execute(&config, client).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
