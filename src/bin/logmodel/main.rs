//! logmodel CLI - Structured models of MSBuild logs

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use logmodel::util::config::{global_config_path, load_config, project_config_path};
use logmodel::util::Config;

/// Settings shared by every command.
pub struct Session {
    pub config: Config,
    pub verbose: bool,
    pub color: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("logmodel=debug")
    } else {
        EnvFilter::new("logmodel=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));
    let session = Session {
        config,
        verbose: cli.verbose,
        color: !cli.no_color && std::io::stderr().is_terminal(),
    };

    // Execute command
    match cli.command {
        Commands::Show(args) => commands::show::execute(args, &session),
        Commands::Check(args) => commands::check::execute(args, &session),
        Commands::Summary(args) => commands::summary::execute(args, &session),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
