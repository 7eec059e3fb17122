//! # Merge Sentinel CLI
//!
//! Command-line interface for evaluating the CI run status of pull
//! requests and commits.
//!
//! This binary answers one question: does the given pull request or
//! commit carry a failing CI signal? It is read-only and intended for
//! merge-gating scripts; a failing verdict maps to a dedicated non-zero
//! exit code.
//!
//! # Commands
//!
//! - `check-pr` - Evaluate a pull request's CI status
//! - `check-commit` - Evaluate a single commit's CI status
//! - `config` - Manage configuration files and settings
//! - `auth` - Store GitHub credentials in the system keyring
//!
//! # Examples
//!
//! ```bash
//! # Evaluate a pull request
//! merge-sentinel check-pr --repo owner/repo --pr-number 123
//!
//! # Evaluate a single commit, listing its check runs
//! merge-sentinel check-commit --repo owner/repo --sha <sha> --list
//!
//! # Store a GitHub token
//! merge-sentinel auth github token
//! ```

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

/// Command implementations for the CLI.
mod commands;

/// Configuration management for the CLI.
mod config;

/// Error types specific to the CLI.
mod errors;

use commands::{
    auth::AuthCommands, check_commit::CheckCommitArgs, check_pr::CheckPrArgs,
    config_cmd::ConfigCommands,
};
use errors::CliError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Command-line interface structure for Merge Sentinel.
///
/// This struct defines the top-level CLI interface using clap's derive
/// API.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands for the Merge Sentinel CLI.
#[derive(Subcommand)]
enum Commands {
    /// Evaluate the CI run status of a pull request
    #[command(name = "check-pr")]
    CheckPr(CheckPrArgs),

    /// Evaluate the CI run status of a single commit
    #[command(name = "check-commit")]
    CheckCommit(CheckCommitArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Store GitHub credentials
    #[command(subcommand)]
    Auth(AuthCommands),
}

/// Main entry point for the Merge Sentinel CLI.
///
/// Initializes logging, parses command-line arguments, and dispatches to
/// the appropriate command handler.
///
/// # Returns
///
/// Returns `Ok(())` on successful execution, or a `CliError` whose
/// `Termination` impl selects the process exit code. A pull request or
/// commit with failing CI exits with code 1.
#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().pretty())
        .with(EnvFilter::from_env("MERGE_SENTINEL_LOG"))
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::CheckPr(args) => {
            if let Err(e) = commands::check_pr::execute(args).await {
                error!("Error evaluating pull request: {}", e);
                return Err(e);
            }
        }
        Commands::CheckCommit(args) => {
            if let Err(e) = commands::check_commit::execute(args).await {
                error!("Error evaluating commit: {}", e);
                return Err(e);
            }
        }
        Commands::Config(cmd) => {
            if let Err(e) = commands::config_cmd::execute(cmd).await {
                error!("Error executing config command: {}", e);
                return Err(e);
            }
        }
        Commands::Auth(cmd) => {
            if let Err(e) = commands::auth::execute(cmd).await {
                error!("Error executing auth command: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
