//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reviewroot")]
#[command(
    author,
    version,
    about = "Ask questions about product reviews with a local RAG pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.config/reviewroot/config.yml)
    #[arg(long, global = true, env = "REVIEWROOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Minimum similarity a retrieved review must reach (0-1)
    #[arg(long, global = true)]
    pub min_similarity: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build or refresh the review index from the CSV corpus
    Index(IndexArgs),

    /// Show index status
    Status,

    /// Start the tool server on stdin/stdout
    Mcp,

    /// Interactive console talking to a spawned tool server
    Console,

    /// Answer a question directly from retrieved reviews
    Ask(AskArgs),

    /// Run the full review pipeline for one query
    Agent(AgentArgs),
}

#[derive(Args)]
pub struct IndexArgs {
    /// Drop and rebuild the collection even if it is up to date
    #[arg(long)]
    pub recreate: bool,

    /// Review CSV (overrides config and REVIEWROOT_CSV)
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question; starts an interactive loop when omitted
    pub question: Vec<String>,

    /// Number of reviews handed to the LLM
    #[arg(short = 'k', long, default_value = "5")]
    pub k: usize,
}

#[derive(Args)]
pub struct AgentArgs {
    /// Query text
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of reviews to retrieve
    #[arg(short = 'k', long)]
    pub k: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
