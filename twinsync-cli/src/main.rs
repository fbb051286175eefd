//! twinsync: keep two directories in sync, newest file wins.
//!
//! # Usage
//!
//! ```text
//! twinsync sync [--primary <dir>] [--secondary <dir>] [--mode one-directional|bi-directional] [--json]
//! twinsync config show [--json]
//! twinsync config set [--primary <dir>] [--secondary <dir>] [--mode <mode>]
//! twinsync --version
//! ```
//!
//! Every command accepts `--verbose`, which mirrors the log file to stderr.

mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{config::ConfigCommand, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "twinsync",
    version,
    about = "Synchronize a primary and a secondary directory by modification time",
    long_about = None,
)]
struct Cli {
    /// Mirror log output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one synchronization pass.
    Sync(SyncArgs),

    /// Show or change the stored preferences.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let home = dirs::home_dir().context("could not determine home directory")?;

    if let Err(err) = logging::init(&home, cli.verbose) {
        eprintln!("{} file logging disabled: {err:#}", "warning:".yellow());
    }

    match cli.command {
        Commands::Sync(args) => args.run(&home),
        Commands::Config { command } => commands::config::run(command, &home),
    }
}
