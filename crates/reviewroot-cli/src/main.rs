//! Reviewroot CLI
//!
//! Ask questions about a product review corpus.

use anyhow::Result;
use clap::Parser;
use reviewroot_core::error::exit_codes;
use reviewroot_core::{Config, ReviewRootError};

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    // stdout carries the tool protocol in `mcp` mode, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Index(args) => commands::index::run(args, config, cli.format).await,
        Commands::Status => commands::status::run(&config, cli.format).await,
        Commands::Mcp => commands::mcp::run(config).await,
        Commands::Console => commands::console::run(&config, cli.config.as_deref()).await,
        Commands::Ask(args) => commands::ask::run(args, config).await,
        Commands::Agent(args) => commands::agent::run(args, config, cli.format).await,
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(min) = cli.min_similarity {
        config.retrieval.min_similarity = min;
    }
    config.validate()?;

    if cli.verbose {
        eprintln!("Database: {}", config.index.db_path.display());
    }
    Ok(config)
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ReviewRootError>())
        .map(ReviewRootError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
