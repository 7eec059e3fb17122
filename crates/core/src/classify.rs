//! # Signal Classification
//!
//! Pure functions that turn already-fetched CI signals into gating
//! decisions. Nothing in this module performs I/O or constructs errors;
//! the functions only branch on data, which keeps the policy unit
//! testable with canned fixtures.
//!
//! The conclusion-level failing set itself lives on
//! [`CheckConclusion`](merge_sentinel_github::models::CheckConclusion)
//! next to the enumeration it classifies.

use merge_sentinel_github::models::{CheckRun, CombinedStatus};

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;

/// Returns true when any run in the list concluded with a failing
/// conclusion.
///
/// Runs without a conclusion (still queued or executing) are not
/// failing.
pub fn has_failing_run(runs: &[CheckRun]) -> bool {
    runs.iter().any(CheckRun::is_failing)
}

/// Returns true when the combined status reports a terminal-bad
/// aggregate state.
///
/// `failure` and `error` both gate a merge; `pending` and `success` do
/// not.
pub fn has_failing_status(status: &CombinedStatus) -> bool {
    status.state.is_failing()
}

/// Returns true when at least one status context has been recorded.
///
/// The aggregate state alone does not count: the API reports `pending`
/// with zero contexts for commits nothing has reported against.
pub fn has_any_statuses(status: &CombinedStatus) -> bool {
    !status.statuses.is_empty()
}

/// Returns true when a commit has at least one recorded CI signal.
///
/// Takes the answers from the two signal sources, check-runs and legacy
/// status contexts. Callers must have consulted BOTH sources before
/// calling this: deciding from one source alone can produce a false
/// "nothing ran" for a commit whose CI reports only through the other
/// mechanism.
pub fn commit_has_signal(has_check_runs: bool, has_status_contexts: bool) -> bool {
    has_check_runs || has_status_contexts
}
