//! # Merge Sentinel GitHub
//!
//! GitHub API access for commit CI signals: check-runs and the legacy
//! combined status. This crate owns the data models, the
//! [`CommitStatusProvider`] contract, and the octocrab-backed
//! implementation used in production. The evaluation policy that turns
//! fetched signals into a verdict lives in `merge_sentinel_core`.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub mod errors;

pub mod github;

pub mod models;
use errors::Error;
use models::{CheckRun, CombinedStatus};

/// Trait for fetching the CI signals recorded against a commit.
///
/// All operations are read-only network calls with no shared mutable
/// state; each invocation re-fetches fresh data. Every method accepts a
/// [`CancellationToken`]: cancellation aborts in-flight requests and is
/// checked again before each further page request.
///
/// # Example Implementation
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use merge_sentinel_github::CommitStatusProvider;
/// use merge_sentinel_github::errors::Error;
/// use merge_sentinel_github::models::{CheckRun, CombinedStatus};
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Debug)]
/// struct FixtureProvider;
///
/// #[async_trait]
/// impl CommitStatusProvider for FixtureProvider {
///     async fn list_check_runs(
///         &self,
///         repo_owner: &str,
///         repo_name: &str,
///         sha: &str,
///         cancel: &CancellationToken,
///     ) -> Result<Vec<CheckRun>, Error> {
///         // Return canned data for tests
///         # unimplemented!()
///     }
///
///     // Implement other required methods...
///     # async fn has_failing_check_run(&self, _: &str, _: &str, _: &str, _: &CancellationToken) -> Result<bool, Error> { unimplemented!() }
///     # async fn has_any_check_runs(&self, _: &str, _: &str, _: &str, _: &CancellationToken) -> Result<bool, Error> { unimplemented!() }
///     # async fn combined_status(&self, _: &str, _: &str, _: &str, _: &CancellationToken) -> Result<CombinedStatus, Error> { unimplemented!() }
/// }
/// ```
#[async_trait]
pub trait CommitStatusProvider: Send + Sync {
    /// Retrieves the complete set of check-runs for a commit.
    ///
    /// Follows pagination until a short page signals the end of the
    /// collection. Reruns are deduplicated provider-side so only the
    /// latest run per check-suite is returned.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `sha` - The commit SHA to inspect
    /// * `cancel` - Token that aborts the remaining page requests
    ///
    /// # Returns
    ///
    /// A `Result` containing all check-runs recorded against the commit
    async fn list_check_runs(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CheckRun>, Error>;

    /// Determines whether at least one check-run for a commit concluded
    /// with a failing conclusion.
    ///
    /// Stops paginating as soon as a failing run is observed; callers
    /// that need the full list use [`list_check_runs`] instead.
    ///
    /// [`list_check_runs`]: CommitStatusProvider::list_check_runs
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `sha` - The commit SHA to inspect
    /// * `cancel` - Token that aborts the remaining page requests
    ///
    /// # Returns
    ///
    /// A `Result` containing `true` if any run failed
    async fn has_failing_check_run(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, Error>;

    /// Determines whether any check-runs exist for a commit.
    ///
    /// Issues a single single-item page request; never fetches the full
    /// collection.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `sha` - The commit SHA to inspect
    /// * `cancel` - Token that aborts the request
    ///
    /// # Returns
    ///
    /// A `Result` containing `true` if the commit has at least one run
    async fn has_any_check_runs(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, Error>;

    /// Retrieves the combined legacy status for a commit.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `sha` - The commit SHA to inspect
    /// * `cancel` - Token that aborts the request
    ///
    /// # Returns
    ///
    /// A `Result` containing the aggregate state and the individual
    /// status contexts
    async fn combined_status(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        cancel: &CancellationToken,
    ) -> Result<CombinedStatus, Error>;
}
