//! Command-line interface for lintwatch
//!
//! This module provides the main CLI structure and command handling.
//! It uses clap for argument parsing; running `lintwatch` without a
//! subcommand starts watching with the configured settings.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;
pub mod session;

pub use output::Output;

/// lintwatch - run your linters on every file you save
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable quiet output (results only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Watch a directory and lint files as they change (default)
    Watch(WatchArgs),
    /// Run the linter pipeline once on the given files
    Run(RunArgs),
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Default)]
pub struct WatchArgs {
    /// Directory to watch instead of the configured one
    #[arg(long, value_name = "DIR")]
    pub watch_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Files to lint
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show {
        /// Output format (toml, yaml, json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
    /// Validate the merged configuration
    Validate,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);
        let config = self.config.as_deref();

        match self.command {
            Some(Commands::Watch(args)) => commands::watch::execute(args, config, &output).await,
            Some(Commands::Run(args)) => commands::run::execute(args, config, &output).await,
            Some(Commands::Config(cmd)) => commands::config::execute(cmd, config, &output).await,
            None => commands::watch::execute(WatchArgs::default(), config, &output).await,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,notify=warn,globset=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,notify=warn,globset=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    // Results own stdout
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
