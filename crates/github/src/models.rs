//! # Models
//!
//! Data models shared between the GitHub API layer and the run status
//! evaluation logic.
//!
//! The provider enumerations (`CheckConclusion`, `CheckRunStatus`,
//! `CommitState`) are modeled as closed variants with snake_case wire
//! names, so the classification policy operates on typed values rather
//! than on whatever strings the transport happens to return.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Check-run conclusions that count as a failed run when gating a merge.
///
/// This is a policy decision, not a GitHub default: `cancelled` and
/// `action_required` do not block merges in GitHub's own UI, but a bot
/// acting on a "not failed" verdict must not merge past them. Kept as a
/// single constant so the failing set can be audited and changed in one
/// place.
pub const FAILING_CONCLUSIONS: [CheckConclusion; 4] = [
    CheckConclusion::ActionRequired,
    CheckConclusion::Cancelled,
    CheckConclusion::Failure,
    CheckConclusion::TimedOut,
];

lazy_static! {
    /// Pre-compiled regex for the commit SHA shape: 40 lowercase hex characters
    static ref COMMIT_SHA_REGEX: Regex =
        Regex::new(r"^[0-9a-f]{40}$").expect("Failed to compile commit SHA regex");
}

/// Returns true when the given string has the shape of a full commit SHA.
///
/// GitHub identifies commits by 40-character lowercase hexadecimal SHA-1
/// strings. Abbreviated, uppercase, or otherwise malformed values are
/// rejected; callers treat such values as "no commit available" rather
/// than sending them to the API.
pub fn is_commit_sha(value: &str) -> bool {
    COMMIT_SHA_REGEX.is_match(value)
}

/// The terminal outcome of a completed check-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    /// The run requires action from a user before it can proceed
    ActionRequired,

    /// The run was cancelled before it finished
    Cancelled,

    /// The run completed and failed
    Failure,

    /// The run completed with a result that is neither success nor failure
    Neutral,

    /// The run was skipped
    Skipped,

    /// The run result belongs to an outdated push and has been superseded
    Stale,

    /// The run completed successfully
    Success,

    /// The run exceeded its time limit
    TimedOut,
}

impl CheckConclusion {
    /// Whether this conclusion counts as a failed run for gating purposes.
    ///
    /// See [`FAILING_CONCLUSIONS`] for the set and the rationale.
    pub fn is_failing(&self) -> bool {
        FAILING_CONCLUSIONS.contains(self)
    }
}

/// A single CI job result reported against a commit.
///
/// Immutable snapshot of what the API returned at fetch time; a run that
/// has not completed yet carries no conclusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRun {
    /// The unique identifier of the check run
    pub id: u64,

    /// The name of the check, as reported by the CI application
    pub name: String,

    /// The lifecycle phase of the run
    pub status: CheckRunStatus,

    /// The terminal outcome, absent while the run is queued or in progress
    #[serde(default)]
    pub conclusion: Option<CheckConclusion>,

    /// When the run started, if it has started
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    /// When the run completed, if it has completed
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CheckRun {
    /// Whether this run concluded with a failing conclusion.
    ///
    /// Runs that are still queued or in progress have no conclusion and
    /// are not failing.
    pub fn is_failing(&self) -> bool {
        self.conclusion.is_some_and(|c| c.is_failing())
    }
}

/// The lifecycle phase of a check-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    /// The run has finished and reported a conclusion
    Completed,

    /// The run is currently executing
    InProgress,

    /// The run is waiting to be scheduled
    Queued,
}

/// The combined legacy status for a commit.
///
/// Aggregates the individual status contexts reported through the older
/// commit status API. A commit with zero contexts has not had any status
/// reported against it, regardless of the aggregate `state` field (the
/// API reports `pending` for commits nothing has touched).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// The aggregate state across all contexts
    pub state: CommitState,

    /// The individual status contexts
    #[serde(default)]
    pub statuses: Vec<StatusContext>,
}

/// The state of a commit status, individual or aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    /// A status reporter hit an error while producing its result
    Error,

    /// A status reporter recorded a failure
    Failure,

    /// Statuses are still being produced, or none exist
    Pending,

    /// All statuses succeeded
    Success,
}

impl CommitState {
    /// Whether this state is terminal-bad.
    ///
    /// Both `failure` and `error` gate a merge; `pending` and `success`
    /// do not.
    pub fn is_failing(&self) -> bool {
        matches!(self, CommitState::Error | CommitState::Failure)
    }
}

/// The commits of a pull request that are relevant for CI evaluation.
///
/// Supplied by the caller; the evaluator never mutates it.
///
/// # Examples
///
/// ```
/// use merge_sentinel_github::models::PullRequest;
///
/// let pr = PullRequest {
///     number: 123,
///     head_sha: Some("a".repeat(40)),
///     merge_commit_sha: None,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// The pull request number
    pub number: u64,

    /// The tip commit of the pull request's source branch, if known
    pub head_sha: Option<String>,

    /// The synthetic commit GitHub created to represent the hypothetical
    /// merge into the target branch, if one exists
    pub merge_commit_sha: Option<String>,
}

/// Coordinates of a repository on the hosting provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// The account that owns the repository
    pub owner: String,

    /// The repository name
    pub name: String,
}

/// A single named status context within a combined status.
///
/// Only the presence of contexts matters for run evaluation; the fields
/// are kept for logging and for callers that display them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusContext {
    /// The name identifying the status reporter
    pub context: String,

    /// The state this context reported
    pub state: CommitState,
}
