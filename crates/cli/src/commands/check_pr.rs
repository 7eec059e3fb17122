use clap::Args;
use merge_sentinel_core::RunStatusEvaluator;
use merge_sentinel_github::github::GitHubStatusProvider;
use merge_sentinel_github::models::Repository;
use serde::Serialize;
use tracing::{info, instrument};

use crate::commands::{
    cancellation_on_interrupt, create_github_client, load_config, split_repository,
};
use crate::errors::CliError;

/// Arguments for the check-pr command
#[derive(Args, Debug)]
pub struct CheckPrArgs {
    /// Repository in owner/name form
    #[arg(short, long)]
    pub repo: String,

    /// The pull request number
    #[arg(short, long)]
    pub pr_number: u64,

    /// Alternate config file
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Result of the check-pr command
#[derive(Debug, Serialize)]
pub struct PullRequestVerdict {
    /// The repository the pull request belongs to
    pub repository: String,

    /// The pull request number
    pub pull_request: u64,

    /// Whether the pull request has a failing CI run
    pub failed: bool,
}

/// Executes the `check-pr` command.
///
/// Fetches the pull request to learn its head and merge commit SHAs,
/// evaluates its CI status, and prints the verdict as JSON. A failing
/// verdict is also reported through the exit code so merge-gating
/// scripts can branch on it directly.
///
/// # Arguments
///
/// * `args` - The command-line arguments for the `check-pr` command.
///
/// # Returns
///
/// Returns `Ok(())` when the pull request has no failing CI signal, or a
/// `CliError` when it does or when the evaluation itself fails.
#[instrument]
pub async fn execute(args: CheckPrArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let (owner, name) = split_repository(&args.repo)?;

    let octocrab = create_github_client(&config)?;
    let cancel = cancellation_on_interrupt();

    let provider = GitHubStatusProvider::new(octocrab);
    let pull_request = provider
        .fetch_pull_request(&owner, &name, args.pr_number, &cancel)
        .await
        .map_err(|e| CliError::NetworkError(format!("Failed to fetch the pull request: {}", e)))?;

    info!(
        repository_owner = owner,
        repository = name,
        pull_request = args.pr_number,
        "Evaluating pull request CI status"
    );

    let repository = Repository { owner, name };
    let evaluator = RunStatusEvaluator::new(provider);
    let failed = evaluator
        .has_failed_run(&repository, &pull_request, &cancel)
        .await
        .map_err(|e| {
            CliError::NetworkError(format!("Failed to evaluate the pull request: {}", e))
        })?;

    let verdict = PullRequestVerdict {
        repository: args.repo,
        pull_request: args.pr_number,
        failed,
    };
    let output = serde_json::to_string_pretty(&verdict)
        .map_err(|e| CliError::Other(format!("Failed to serialize the verdict: {}", e)))?;
    println!("{}", output);

    if failed {
        return Err(CliError::CheckFailed(format!(
            "pull request {} has a failing run",
            verdict.pull_request
        )));
    }

    Ok(())
}
