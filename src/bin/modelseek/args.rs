//! Command line argument parsing for the modelseek CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// modelseek - hybrid retrieval over AI-model catalogs
#[derive(Parser, Debug, Clone)]
#[command(name = "modelseek")]
#[command(about = "Hybrid lexical and dense retrieval over AI-model catalogs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct ModelseekArgs {
    /// Verbosity level (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "MODELSEEK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl ModelseekArgs {
    /// Effective verbosity: 0 quiet, 1 normal, 2+ debug.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build and persist a dense index for a corpus
    Index(IndexArgs),

    /// Route and run a query
    Search(SearchArgs),

    /// Show the routing decision for a query
    Route(RouteArgs),

    /// Show index statistics for a corpus
    Stats(StatsArgs),
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Corpus file (JSON array of documents)
    #[arg(long, value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Directory receiving the dense index
    #[arg(long, value_name = "INDEX_DIR")]
    pub out: PathBuf,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Corpus file (JSON array of documents)
    #[arg(long, value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Directory holding a persisted dense index
    #[arg(long, value_name = "INDEX_DIR")]
    pub dense: Option<PathBuf>,

    /// Maximum number of results
    #[arg(short = 'k', long, default_value = "10")]
    pub top_k: usize,

    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,
}

/// Arguments for routing
#[derive(Parser, Debug, Clone)]
pub struct RouteArgs {
    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,
}

/// Arguments for statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Corpus file (JSON array of documents)
    #[arg(long, value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Directory holding a persisted dense index
    #[arg(long, value_name = "INDEX_DIR")]
    pub dense: Option<PathBuf>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
