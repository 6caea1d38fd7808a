//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// logmodel - Structured models of MSBuild logs
#[derive(Parser)]
#[command(name = "logmodel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the model of a recorded build
    Show(ShowArgs),

    /// Build the model and report every problem found
    Check(CheckArgs),

    /// Print counts of projects, targets, tasks and diagnostics
    Summary(SummaryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    /// JSON-lines build log
    pub log: PathBuf,

    /// Output format (tree, json)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Include messages in the tree
    #[arg(short, long)]
    pub messages: bool,

    /// Exit successfully even if the model has errors
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// JSON-lines build log
    pub log: PathBuf,
}

#[derive(Args)]
pub struct SummaryArgs {
    /// JSON-lines build log
    pub log: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit successfully even if the model has errors
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
