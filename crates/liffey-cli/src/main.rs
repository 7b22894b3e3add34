#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "liffey")]
#[command(author, version, about = "Dev server configuration inspector for liffey", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted logs (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate the project configuration and report problems
    Check {
        /// Explicit config file path (overrides auto-discovery)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Print the resolved canonical configuration as JSON
    Print {
        /// Explicit config file path (overrides auto-discovery)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let cwd = match cli.cwd {
        Some(path) => path,
        None => std::env::current_dir().into_diagnostic()?,
    };

    match cli.command {
        Commands::Check { config } => commands::check::run(&cwd, config.as_deref(), cli.json),
        Commands::Print { config, pretty } => commands::print::run(&cwd, config.as_deref(), pretty),
    }
}
