use async_trait::async_trait;
use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::{
    errors::Error,
    models::{CheckRun, CombinedStatus, PullRequest},
    CommitStatusProvider,
};

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;

/// Number of check-runs requested per page.
///
/// This is the maximum the API allows. A page with fewer items than this
/// is the last page.
pub const CHECK_RUNS_PAGE_SIZE: u8 = 100;

/// Query parameters for the check-runs endpoint.
///
/// `filter=latest` asks GitHub to return only the most recent run per
/// check-suite, so superseded reruns cannot produce false failures.
#[derive(Debug, Serialize)]
struct CheckRunsQuery {
    filter: &'static str,
    page: u32,
    per_page: u8,
}

/// One page of the check-runs listing as returned by the API.
#[derive(Debug, Deserialize)]
struct CheckRunsPage {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    check_runs: Vec<CheckRun>,
}

/// Creates an `Octocrab` client authenticated with a personal access token.
///
/// # Arguments
///
/// * `token` - A GitHub personal access token with `checks:read` and
///   `statuses:read` scope on the repositories being evaluated.
///
/// # Returns
///
/// A `Result` containing the authenticated client, or an `Error` if the
/// client cannot be built.
#[instrument(skip(token))]
pub fn create_token_client(token: &str) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|_| Error::ApiError())
}

/// Creates an `Octocrab` client authenticated as a GitHub App.
///
/// Parses the PEM private key and builds a client that signs its requests
/// with an app JWT. The app needs read access to checks and commit
/// statuses on the repositories being evaluated.
///
/// # Arguments
///
/// * `app_id` - The ID of the GitHub App.
/// * `private_key` - The private key associated with the app, in PEM format.
///
/// # Returns
///
/// A `Result` containing the authenticated client, or an `Error` if the
/// key cannot be parsed or the client cannot be built.
#[instrument(skip(private_key))]
pub fn create_app_client(app_id: u64, private_key: &str) -> Result<Octocrab, Error> {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|e| {
        Error::AuthError(format!("Failed to translate the private key. Error was: {}", e))
    })?;

    let octocrab = Octocrab::builder()
        .app(app_id.into(), key)
        .build()
        .map_err(|_| Error::AuthError("Failed to build a client for the GitHub app.".to_string()))?;

    info!(app_id, "Created client for the GitHub app");

    Ok(octocrab)
}

/// Logs an octocrab failure with its specifics and maps it onto [`Error`].
fn map_octocrab_error(message: &str, e: octocrab::Error) -> Error {
    match e {
        octocrab::Error::GitHub { source, backtrace } => {
            let err = *source;
            error!(
                error_message = err.message,
                backtrace = backtrace.to_string(),
                "{}. Received an error from GitHub",
                message
            );

            if err.message.contains("rate limit") {
                return Error::RateLimitExceeded;
            }

            Error::ApiError()
        }
        octocrab::Error::UriParse { source, backtrace } => {
            error!(
                error_message = source.to_string(),
                backtrace = backtrace.to_string(),
                "{}. Failed to parse URI.",
                message
            );
            Error::InvalidResponse
        }
        octocrab::Error::Uri { source, backtrace } => {
            error!(
                error_message = source.to_string(),
                backtrace = backtrace.to_string(),
                "{}. Failed to parse URI.",
                message
            );
            Error::InvalidResponse
        }
        octocrab::Error::Serde { source, backtrace } => {
            error!(
                error_message = source.to_string(),
                backtrace = backtrace.to_string(),
                "{}. Failed to deserialize the response body.",
                message
            );
            Error::InvalidResponse
        }
        _ => {
            error!(error_message = e.to_string(), message);
            Error::ApiError()
        }
    }
}

/// GitHub-backed implementation of [`CommitStatusProvider`].
///
/// Wraps an authenticated [`Octocrab`] client. The check-runs and
/// combined-status endpoints are called through octocrab's raw `get`
/// with typed request and response structs, since the typed API surface
/// does not expose the pagination and rerun filters these queries need.
#[derive(Debug, Default)]
pub struct GitHubStatusProvider {
    client: Octocrab,
}

impl GitHubStatusProvider {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Fetch the commits of a pull request that are relevant for CI
    /// evaluation: the branch head and, when GitHub has synthesized one,
    /// the merge commit.
    #[instrument]
    pub async fn fetch_pull_request(
        &self,
        repo_owner: &str,
        repo_name: &str,
        pr_number: u64,
        cancel: &CancellationToken,
    ) -> Result<PullRequest, Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let pulls = self.client.pulls(repo_owner, repo_name);
        let pr = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = pulls.get(pr_number) => {
                result.map_err(|e| map_octocrab_error("Failed to get pull request information", e))?
            }
        };

        Ok(PullRequest {
            number: pr.number,
            head_sha: Some(pr.head.sha),
            merge_commit_sha: pr.merge_commit_sha,
        })
    }

    /// Fetch one page of the check-runs listing for a commit.
    async fn fetch_check_runs_page(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        page: u32,
        per_page: u8,
        cancel: &CancellationToken,
    ) -> Result<CheckRunsPage, Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let route = format!(
            "/repos/{}/{}/commits/{}/check-runs",
            repo_owner, repo_name, sha
        );
        let query = CheckRunsQuery {
            filter: "latest",
            page,
            per_page,
        };

        let response: CheckRunsPage = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.client.get(&route, Some(&query)) => {
                result.map_err(|e| map_octocrab_error("Failed to list check runs for commit", e))?
            }
        };

        Ok(response)
    }
}

#[async_trait]
impl CommitStatusProvider for GitHubStatusProvider {
    #[instrument]
    async fn list_check_runs(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CheckRun>, Error> {
        let mut runs = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response = self
                .fetch_check_runs_page(repo_owner, repo_name, sha, page, CHECK_RUNS_PAGE_SIZE, cancel)
                .await?;

            let fetched = response.check_runs.len();
            runs.extend(response.check_runs);

            // A short page is the last page
            if fetched < CHECK_RUNS_PAGE_SIZE as usize {
                break;
            }

            page += 1;
        }

        debug!(
            repository_owner = repo_owner,
            repository = repo_name,
            sha,
            count = runs.len(),
            "Collected check runs for commit"
        );

        Ok(runs)
    }

    #[instrument]
    async fn has_failing_check_run(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, Error> {
        let mut page: u32 = 1;

        loop {
            let response = self
                .fetch_check_runs_page(repo_owner, repo_name, sha, page, CHECK_RUNS_PAGE_SIZE, cancel)
                .await?;

            // The caller only needs existence of a failure, so stop at the
            // first failing conclusion instead of walking the remaining pages.
            if response.check_runs.iter().any(CheckRun::is_failing) {
                debug!(
                    repository_owner = repo_owner,
                    repository = repo_name,
                    sha,
                    "Found failing check run"
                );
                return Ok(true);
            }

            if response.check_runs.len() < CHECK_RUNS_PAGE_SIZE as usize {
                return Ok(false);
            }

            page += 1;
        }
    }

    #[instrument]
    async fn has_any_check_runs(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, Error> {
        // A single-item page is enough to answer an existence probe; the
        // reported total covers the whole collection
        let response = self
            .fetch_check_runs_page(repo_owner, repo_name, sha, 1, 1, cancel)
            .await?;

        Ok(response.total_count > 0 || !response.check_runs.is_empty())
    }

    #[instrument]
    async fn combined_status(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<CombinedStatus, Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let route = format!("/repos/{}/{}/commits/{}/status", repo_owner, repo_name, sha);

        let status: CombinedStatus = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.client.get(&route, None::<&()>) => {
                result.map_err(|e| map_octocrab_error("Failed to get combined status for commit", e))?
            }
        };

        Ok(status)
    }
}
