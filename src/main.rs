mod agents;
mod cli;
mod config;
mod error;
mod registry;
mod repository;
mod workflow;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Update(args) => workflow::execute_update(&cli.path, config, args, cli.verbose)
            .with_context(|| format!("Failed to update {}", cli.path.display())),
        Commands::Check(args) => workflow::execute_check(&cli.path, config, args, cli.verbose)
            .with_context(|| format!("Failed to check {}", cli.path.display())),
    }
}

/// Logs go to stderr so stdout carries only the Markdown report.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
