use clap::Args;
use merge_sentinel_core::RunStatusEvaluator;
use merge_sentinel_github::github::GitHubStatusProvider;
use merge_sentinel_github::models::is_commit_sha;
use serde::Serialize;
use tracing::{info, instrument};

use crate::commands::{
    cancellation_on_interrupt, create_github_client, load_config, split_repository,
};
use crate::errors::CliError;

/// Arguments for the check-commit command
#[derive(Args, Debug)]
pub struct CheckCommitArgs {
    /// Repository in owner/name form
    #[arg(short, long)]
    pub repo: String,

    /// The full commit SHA to evaluate
    #[arg(short, long)]
    pub sha: String,

    /// Print the complete check-run list instead of the verdict
    #[arg(short, long)]
    pub list: bool,

    /// Alternate config file
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Result of the check-commit command
#[derive(Debug, Serialize)]
pub struct CommitVerdict {
    /// The repository the commit belongs to
    pub repository: String,

    /// The evaluated commit SHA
    pub sha: String,

    /// Whether the commit has a failing run or status
    pub failed: bool,

    /// Whether any check-runs exist for the commit
    pub has_check_runs: bool,

    /// Whether any legacy status contexts exist for the commit
    pub has_statuses: bool,
}

/// Executes the `check-commit` command.
///
/// Evaluates the CI signals recorded against a single commit. The
/// default output is a JSON verdict that also reports the two existence
/// probes, so callers can tell "clean because CI passed" apart from
/// "clean because nothing ran". With `--list` the complete check-run
/// collection is printed instead.
///
/// # Arguments
///
/// * `args` - The command-line arguments for the `check-commit` command.
///
/// # Returns
///
/// Returns `Ok(())` when the commit has no failing CI signal, or a
/// `CliError` when it does or when the evaluation itself fails.
#[instrument]
pub async fn execute(args: CheckCommitArgs) -> Result<(), CliError> {
    if !is_commit_sha(&args.sha) {
        return Err(CliError::InvalidArguments(format!(
            "Expected a full 40-character lowercase commit SHA, got: {}",
            args.sha
        )));
    }

    let config = load_config(args.config.as_deref())?;
    let (owner, name) = split_repository(&args.repo)?;

    let octocrab = create_github_client(&config)?;
    let cancel = cancellation_on_interrupt();

    let evaluator = RunStatusEvaluator::new(GitHubStatusProvider::new(octocrab));

    info!(
        repository_owner = owner,
        repository = name,
        sha = args.sha,
        "Evaluating commit CI status"
    );

    if args.list {
        let runs = evaluator
            .all_runs(&owner, &name, &args.sha, &cancel)
            .await
            .map_err(|e| CliError::NetworkError(format!("Failed to list check runs: {}", e)))?;

        let output = serde_json::to_string_pretty(&runs)
            .map_err(|e| CliError::Other(format!("Failed to serialize the run list: {}", e)))?;
        println!("{}", output);

        return Ok(());
    }

    let failed = evaluator
        .has_commit_failure(&owner, &name, &args.sha, &cancel)
        .await
        .map_err(|e| CliError::NetworkError(format!("Failed to evaluate the commit: {}", e)))?;
    let has_check_runs = evaluator
        .has_any_runs(&owner, &name, &args.sha, &cancel)
        .await
        .map_err(|e| CliError::NetworkError(format!("Failed to probe check runs: {}", e)))?;
    let has_statuses = evaluator
        .has_any_statuses(&owner, &name, &args.sha, &cancel)
        .await
        .map_err(|e| CliError::NetworkError(format!("Failed to probe statuses: {}", e)))?;

    let verdict = CommitVerdict {
        repository: args.repo,
        sha: args.sha,
        failed,
        has_check_runs,
        has_statuses,
    };
    let output = serde_json::to_string_pretty(&verdict)
        .map_err(|e| CliError::Other(format!("Failed to serialize the verdict: {}", e)))?;
    println!("{}", output);

    if failed {
        return Err(CliError::CheckFailed(format!(
            "commit {} has a failing run or status",
            verdict.sha
        )));
    }

    Ok(())
}
