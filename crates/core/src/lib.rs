//! # Merge Sentinel Core
//!
//! Core logic for deciding whether a pull request or commit has a
//! failing CI signal.
//!
//! The evaluator reconciles two GitHub reporting mechanisms, check-runs
//! and the legacy combined status, across the two commits a pull request
//! can carry: the branch head and the synthetic merge commit. GitHub
//! creates the merge commit to represent exactly what would land on the
//! base branch, so when CI has run against it that result is
//! authoritative; the branch head is only consulted when the merge
//! commit has no recorded signal at all.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use merge_sentinel_core::RunStatusEvaluator;
//! use merge_sentinel_github::models::{PullRequest, Repository};
//! use merge_sentinel_github::CommitStatusProvider;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn gate_merge<P: CommitStatusProvider + std::fmt::Debug>(provider: P) -> Result<()> {
//!     let evaluator = RunStatusEvaluator::new(provider);
//!
//!     let repository = Repository {
//!         owner: "example".to_string(),
//!         name: "example".to_string(),
//!     };
//!     let pull_request = PullRequest {
//!         number: 123,
//!         head_sha: Some("6dcb09b5b57875f334f61aebed695e2e4193db5e".to_string()),
//!         merge_commit_sha: None,
//!     };
//!
//!     let cancel = CancellationToken::new();
//!     if evaluator
//!         .has_failed_run(&repository, &pull_request, &cancel)
//!         .await?
//!     {
//!         println!("CI is broken; hold the merge");
//!     }
//!
//!     Ok(())
//! }
//! ```

use merge_sentinel_github::models::{is_commit_sha, CheckRun, PullRequest, Repository};
use merge_sentinel_github::CommitStatusProvider;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

pub mod classify;

pub mod errors;
use errors::EvaluatorError;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Filters a caller-supplied SHA down to a value safe to evaluate.
///
/// Values that do not have the shape of a full commit SHA are treated as
/// absent, mirroring the "no head SHA means nothing to gate on" rule.
fn usable_sha(sha: Option<&str>) -> Option<&str> {
    sha.filter(|s| is_commit_sha(s))
}

/// Evaluates the CI run status of pull requests and commits.
///
/// `RunStatusEvaluator` holds no state beyond the provider it queries;
/// every call re-fetches fresh data, so repeated invocations for the
/// same commit reflect the current API responses. Calls for different
/// commits are independent and safe to run concurrently.
///
/// # Examples
///
/// ```rust,no_run
/// use merge_sentinel_core::RunStatusEvaluator;
/// use merge_sentinel_github::CommitStatusProvider;
/// use tokio_util::sync::CancellationToken;
/// use anyhow::Result;
///
/// async fn example<P: CommitStatusProvider + std::fmt::Debug>(provider: P) -> Result<()> {
///     let evaluator = RunStatusEvaluator::new(provider);
///
///     let cancel = CancellationToken::new();
///     let failed = evaluator
///         .has_commit_failure(
///             "example",
///             "example",
///             "6dcb09b5b57875f334f61aebed695e2e4193db5e",
///             &cancel,
///         )
///         .await?;
///
///     println!("Commit has failing CI: {}", failed);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct RunStatusEvaluator<P: CommitStatusProvider> {
    /// The provider used to fetch CI signals
    provider: P,
}

impl<P: CommitStatusProvider + std::fmt::Debug> RunStatusEvaluator<P> {
    /// Creates a new evaluator using the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Determines whether a pull request has a failing CI run.
    ///
    /// Implements the reconciliation between the merge commit and the
    /// branch head:
    ///
    /// 1. With no usable SHA at all the pull request is unevaluable and
    ///    reports `false`; there is nothing to gate on.
    /// 2. When a merge commit exists it is evaluated first. A failure on
    ///    it is reported immediately. A clean result with at least one
    ///    recorded signal, from either check-runs or status contexts, is
    ///    trusted without consulting the head.
    /// 3. Only a merge commit nothing has reported against falls back to
    ///    the branch head, so "not failed" is never reported just
    ///    because CI has not started.
    ///
    /// A transport error while evaluating the merge commit is surfaced
    /// to the caller; the evaluator does not guess from the head in that
    /// case.
    ///
    /// # Arguments
    ///
    /// * `repository` - The repository the pull request belongs to
    /// * `pull_request` - The head and merge commit SHAs to evaluate
    /// * `cancel` - Token that aborts outstanding fetches
    ///
    /// # Returns
    ///
    /// A `Result` containing `true` if a failing run or status gates the
    /// pull request
    #[instrument]
    pub async fn has_failed_run(
        &self,
        repository: &Repository,
        pull_request: &PullRequest,
        cancel: &CancellationToken,
    ) -> Result<bool, EvaluatorError> {
        let head_sha = usable_sha(pull_request.head_sha.as_deref());
        if pull_request.head_sha.is_some() && head_sha.is_none() {
            warn!(
                pull_request = pull_request.number,
                "Head SHA does not have the shape of a commit SHA; treating it as absent"
            );
        }

        let merge_sha = usable_sha(pull_request.merge_commit_sha.as_deref());
        if pull_request.merge_commit_sha.is_some() && merge_sha.is_none() {
            warn!(
                pull_request = pull_request.number,
                "Merge commit SHA does not have the shape of a commit SHA; treating it as absent"
            );
        }

        if head_sha.is_none() && merge_sha.is_none() {
            debug!(
                repository_owner = repository.owner,
                repository = repository.name,
                pull_request = pull_request.number,
                "Pull request has no evaluable commit"
            );
            return Ok(false);
        }

        if let Some(merge_sha) = merge_sha {
            let status = self
                .provider
                .combined_status(&repository.owner, &repository.name, merge_sha, cancel)
                .await?;
            if classify::has_failing_status(&status) {
                return Ok(true);
            }

            if self
                .provider
                .has_failing_check_run(&repository.owner, &repository.name, merge_sha, cancel)
                .await?
            {
                return Ok(true);
            }

            // The merge commit is clean. Trust that only if CI actually
            // reported something against it; both signal sources have been
            // consulted at this point.
            let has_runs = self
                .provider
                .has_any_check_runs(&repository.owner, &repository.name, merge_sha, cancel)
                .await?;
            if classify::commit_has_signal(has_runs, classify::has_any_statuses(&status)) {
                debug!(
                    repository_owner = repository.owner,
                    repository = repository.name,
                    pull_request = pull_request.number,
                    "Merge commit has a clean recorded CI result"
                );
                return Ok(false);
            }

            debug!(
                repository_owner = repository.owner,
                repository = repository.name,
                pull_request = pull_request.number,
                "No CI signal recorded against the merge commit; falling back to the head"
            );
        }

        if cancel.is_cancelled() {
            return Err(EvaluatorError::Cancelled);
        }

        match head_sha {
            Some(sha) => {
                self.has_commit_failure(&repository.owner, &repository.name, sha, cancel)
                    .await
            }
            None => Ok(false),
        }
    }

    /// Determines whether a commit has a failing CI signal from either
    /// reporting mechanism.
    ///
    /// A failing check-run conclusion or a terminal-bad combined status
    /// state both count. The check-run query short-circuits, so the
    /// legacy status is only fetched when no failing run exists.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `sha` - The commit SHA to evaluate
    /// * `cancel` - Token that aborts outstanding fetches
    ///
    /// # Returns
    ///
    /// A `Result` containing `true` if the commit has a failing signal
    #[instrument]
    pub async fn has_commit_failure(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, EvaluatorError> {
        if self
            .provider
            .has_failing_check_run(repo_owner, repo_name, sha, cancel)
            .await?
        {
            return Ok(true);
        }

        let status = self
            .provider
            .combined_status(repo_owner, repo_name, sha, cancel)
            .await?;

        Ok(classify::has_failing_status(&status))
    }

    /// Determines whether any check-runs exist for a commit.
    ///
    /// Useful for distinguishing "clean because CI passed" from "clean
    /// because nothing ran".
    #[instrument]
    pub async fn has_any_runs(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, EvaluatorError> {
        let has_runs = self
            .provider
            .has_any_check_runs(repo_owner, repo_name, sha, cancel)
            .await?;

        Ok(has_runs)
    }

    /// Determines whether any legacy status contexts exist for a commit.
    ///
    /// The aggregate state alone does not count; only recorded contexts
    /// do.
    #[instrument]
    pub async fn has_any_statuses(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, EvaluatorError> {
        let status = self
            .provider
            .combined_status(repo_owner, repo_name, sha, cancel)
            .await?;

        Ok(classify::has_any_statuses(&status))
    }

    /// Retrieves the complete check-run list for a commit.
    ///
    /// Follows pagination to the end; intended for inspection and
    /// reporting rather than gating, which only needs
    /// [`has_commit_failure`](RunStatusEvaluator::has_commit_failure).
    #[instrument]
    pub async fn all_runs(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CheckRun>, EvaluatorError> {
        let runs = self
            .provider
            .list_check_runs(repo_owner, repo_name, sha, cancel)
            .await?;

        Ok(runs)
    }
}
