use crate::errors::EvaluatorError;
use crate::RunStatusEvaluator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::test;

use merge_sentinel_github::errors::Error;
use merge_sentinel_github::models::{
    CheckConclusion, CheckRun, CheckRunStatus, CombinedStatus, CommitState, PullRequest,
    Repository, StatusContext,
};
use merge_sentinel_github::CommitStatusProvider;
use tokio_util::sync::CancellationToken;

const HEAD_SHA: &str = "1111111111111111111111111111111111111111";
const MERGE_SHA: &str = "2222222222222222222222222222222222222222";

fn repository() -> Repository {
    Repository {
        owner: "example".to_string(),
        name: "example".to_string(),
    }
}

fn pull_request(head: Option<&str>, merge: Option<&str>) -> PullRequest {
    PullRequest {
        number: 1,
        head_sha: head.map(String::from),
        merge_commit_sha: merge.map(String::from),
    }
}

fn passing_run(id: u64) -> CheckRun {
    CheckRun {
        id,
        name: format!("job-{}", id),
        status: CheckRunStatus::Completed,
        conclusion: Some(CheckConclusion::Success),
        started_at: None,
        completed_at: None,
    }
}

fn failing_run(id: u64) -> CheckRun {
    CheckRun {
        id,
        name: format!("job-{}", id),
        status: CheckRunStatus::Completed,
        conclusion: Some(CheckConclusion::Failure),
        started_at: None,
        completed_at: None,
    }
}

fn empty_status() -> CombinedStatus {
    CombinedStatus {
        state: CommitState::Pending,
        statuses: Vec::new(),
    }
}

fn clean_status(contexts: usize) -> CombinedStatus {
    CombinedStatus {
        state: CommitState::Success,
        statuses: (0..contexts)
            .map(|i| StatusContext {
                context: format!("ci/{}", i),
                state: CommitState::Success,
            })
            .collect(),
    }
}

fn failing_status() -> CombinedStatus {
    CombinedStatus {
        state: CommitState::Failure,
        statuses: vec![StatusContext {
            context: "ci/build".to_string(),
            state: CommitState::Failure,
        }],
    }
}

/// Canned API responses for one commit
#[derive(Debug, Clone)]
struct CommitFixture {
    runs: Vec<CheckRun>,
    status: CombinedStatus,
    error: bool,
}

/// Mock implementation of CommitStatusProvider for testing
#[derive(Debug)]
struct MockStatusProvider {
    commits: HashMap<String, CommitFixture>,
    calls: Arc<Mutex<Vec<(&'static str, String)>>>,
}

impl MockStatusProvider {
    fn new() -> Self {
        Self {
            commits: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_commit(mut self, sha: &str, runs: Vec<CheckRun>, status: CombinedStatus) -> Self {
        self.commits.insert(
            sha.to_string(),
            CommitFixture {
                runs,
                status,
                error: false,
            },
        );
        self
    }

    fn with_error(mut self, sha: &str) -> Self {
        self.commits.insert(
            sha.to_string(),
            CommitFixture {
                runs: Vec::new(),
                status: empty_status(),
                error: true,
            },
        );
        self
    }

    fn call_recorder(&self) -> Arc<Mutex<Vec<(&'static str, String)>>> {
        self.calls.clone()
    }

    fn record(&self, method: &'static str, sha: &str) {
        self.calls
            .lock()
            .expect("Failed to lock the call recorder")
            .push((method, sha.to_string()));
    }

    /// An unknown commit behaves like the real API: nothing recorded yet
    fn fixture(&self, sha: &str) -> CommitFixture {
        self.commits.get(sha).cloned().unwrap_or(CommitFixture {
            runs: Vec::new(),
            status: empty_status(),
            error: false,
        })
    }
}

fn calls_for(calls: &Arc<Mutex<Vec<(&'static str, String)>>>, sha: &str) -> usize {
    calls
        .lock()
        .expect("Failed to lock the call recorder")
        .iter()
        .filter(|(_, s)| s == sha)
        .count()
}

fn total_calls(calls: &Arc<Mutex<Vec<(&'static str, String)>>>) -> usize {
    calls
        .lock()
        .expect("Failed to lock the call recorder")
        .len()
}

#[async_trait]
impl CommitStatusProvider for MockStatusProvider {
    async fn list_check_runs(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        sha: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CheckRun>, Error> {
        self.record("list_check_runs", sha);

        let fixture = self.fixture(sha);
        if fixture.error {
            return Err(Error::ApiError());
        }

        Ok(fixture.runs)
    }

    async fn has_failing_check_run(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        sha: &str,
        _cancel: &CancellationToken,
    ) -> Result<bool, Error> {
        self.record("has_failing_check_run", sha);

        let fixture = self.fixture(sha);
        if fixture.error {
            return Err(Error::ApiError());
        }

        Ok(fixture.runs.iter().any(CheckRun::is_failing))
    }

    async fn has_any_check_runs(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        sha: &str,
        _cancel: &CancellationToken,
    ) -> Result<bool, Error> {
        self.record("has_any_check_runs", sha);

        let fixture = self.fixture(sha);
        if fixture.error {
            return Err(Error::ApiError());
        }

        Ok(!fixture.runs.is_empty())
    }

    async fn combined_status(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        sha: &str,
        _cancel: &CancellationToken,
    ) -> Result<CombinedStatus, Error> {
        self.record("combined_status", sha);

        let fixture = self.fixture(sha);
        if fixture.error {
            return Err(Error::ApiError());
        }

        Ok(fixture.status)
    }
}

#[test]
async fn test_pull_request_without_shas_is_not_failed() {
    let provider = MockStatusProvider::new();
    let calls = provider.call_recorder();
    let evaluator = RunStatusEvaluator::new(provider);

    let failed = evaluator
        .has_failed_run(&repository(), &pull_request(None, None), &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(!failed);
    assert_eq!(total_calls(&calls), 0);
}

#[test]
async fn test_malformed_shas_are_treated_as_absent() {
    let provider = MockStatusProvider::new();
    let calls = provider.call_recorder();
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(Some("deadbeef"), Some("not-a-sha"));
    let failed = evaluator
        .has_failed_run(&repository(), &pr, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(!failed);
    assert_eq!(total_calls(&calls), 0);
}

#[test]
async fn test_failing_merge_commit_reports_failed_without_touching_head() {
    let provider = MockStatusProvider::new()
        .with_commit(MERGE_SHA, vec![failing_run(1)], clean_status(1))
        .with_commit(HEAD_SHA, vec![passing_run(2)], clean_status(1));
    let calls = provider.call_recorder();
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(Some(HEAD_SHA), Some(MERGE_SHA));
    let failed = evaluator
        .has_failed_run(&repository(), &pr, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(failed);
    assert_eq!(calls_for(&calls, HEAD_SHA), 0);
}

#[test]
async fn test_failing_merge_status_reports_failed_without_touching_head() {
    let provider = MockStatusProvider::new()
        .with_commit(MERGE_SHA, vec![passing_run(1)], failing_status())
        .with_commit(HEAD_SHA, vec![passing_run(2)], clean_status(1));
    let calls = provider.call_recorder();
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(Some(HEAD_SHA), Some(MERGE_SHA));
    let failed = evaluator
        .has_failed_run(&repository(), &pr, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(failed);
    assert_eq!(calls_for(&calls, HEAD_SHA), 0);
}

#[test]
async fn test_silent_merge_commit_falls_back_to_failing_head() {
    let provider = MockStatusProvider::new()
        .with_commit(MERGE_SHA, Vec::new(), empty_status())
        .with_commit(HEAD_SHA, vec![failing_run(1)], empty_status());
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(Some(HEAD_SHA), Some(MERGE_SHA));
    let failed = evaluator
        .has_failed_run(&repository(), &pr, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(failed);
}

#[test]
async fn test_clean_merge_commit_with_runs_is_trusted_over_failing_head() {
    let provider = MockStatusProvider::new()
        .with_commit(MERGE_SHA, vec![passing_run(1)], empty_status())
        .with_commit(HEAD_SHA, vec![failing_run(2)], failing_status());
    let calls = provider.call_recorder();
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(Some(HEAD_SHA), Some(MERGE_SHA));
    let failed = evaluator
        .has_failed_run(&repository(), &pr, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    // The merge commit represents what will land; its clean result wins
    assert!(!failed);
    assert_eq!(calls_for(&calls, HEAD_SHA), 0);
}

#[test]
async fn test_clean_merge_commit_with_only_status_contexts_is_trusted() {
    // The merge commit has no check-runs at all, but a legacy status
    // context was recorded against it; that still counts as a signal
    let provider = MockStatusProvider::new()
        .with_commit(MERGE_SHA, Vec::new(), clean_status(1))
        .with_commit(HEAD_SHA, vec![failing_run(1)], empty_status());
    let calls = provider.call_recorder();
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(Some(HEAD_SHA), Some(MERGE_SHA));
    let failed = evaluator
        .has_failed_run(&repository(), &pr, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(!failed);
    assert_eq!(calls_for(&calls, HEAD_SHA), 0);
}

#[test]
async fn test_silent_merge_commit_without_head_is_not_failed() {
    let provider = MockStatusProvider::new().with_commit(MERGE_SHA, Vec::new(), empty_status());
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(None, Some(MERGE_SHA));
    let failed = evaluator
        .has_failed_run(&repository(), &pr, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(!failed);
}

#[test]
async fn test_head_without_any_signal_is_not_failed() {
    let provider = MockStatusProvider::new();
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(Some(HEAD_SHA), None);
    let failed = evaluator
        .has_failed_run(&repository(), &pr, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(!failed);
}

#[test]
async fn test_repeated_evaluation_is_idempotent() {
    let provider = MockStatusProvider::new()
        .with_commit(MERGE_SHA, vec![failing_run(1)], clean_status(1));
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(Some(HEAD_SHA), Some(MERGE_SHA));
    let cancel = CancellationToken::new();

    let first = evaluator
        .has_failed_run(&repository(), &pr, &cancel)
        .await
        .expect("Evaluation should succeed");
    let second = evaluator
        .has_failed_run(&repository(), &pr, &cancel)
        .await
        .expect("Evaluation should succeed");

    assert_eq!(first, second);
    assert!(first);
}

#[test]
async fn test_merge_commit_transport_error_surfaces() {
    let provider = MockStatusProvider::new()
        .with_error(MERGE_SHA)
        .with_commit(HEAD_SHA, vec![passing_run(1)], clean_status(1));
    let calls = provider.call_recorder();
    let evaluator = RunStatusEvaluator::new(provider);

    let pr = pull_request(Some(HEAD_SHA), Some(MERGE_SHA));
    let result = evaluator
        .has_failed_run(&repository(), &pr, &CancellationToken::new())
        .await;

    // The error must not be coerced into a verdict by guessing from the head
    assert!(matches!(result, Err(EvaluatorError::Provider(_))));
    assert_eq!(calls_for(&calls, HEAD_SHA), 0);
}

#[test]
async fn test_cancellation_stops_evaluation_before_any_fetch() {
    let provider = MockStatusProvider::new()
        .with_commit(HEAD_SHA, vec![failing_run(1)], empty_status());
    let calls = provider.call_recorder();
    let evaluator = RunStatusEvaluator::new(provider);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let pr = pull_request(Some(HEAD_SHA), None);
    let result = evaluator.has_failed_run(&repository(), &pr, &cancel).await;

    assert!(matches!(result, Err(EvaluatorError::Cancelled)));
    assert_eq!(total_calls(&calls), 0);
}

#[test]
async fn test_has_commit_failure_prefers_check_runs() {
    let provider = MockStatusProvider::new()
        .with_commit(HEAD_SHA, vec![failing_run(1)], clean_status(1));
    let calls = provider.call_recorder();
    let evaluator = RunStatusEvaluator::new(provider);

    let failed = evaluator
        .has_commit_failure("example", "example", HEAD_SHA, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(failed);

    // The failing run answered the question; the legacy status endpoint
    // was never consulted
    let recorded = calls
        .lock()
        .expect("Failed to lock the call recorder")
        .clone();
    assert_eq!(recorded, vec![("has_failing_check_run", HEAD_SHA.to_string())]);
}

#[test]
async fn test_has_commit_failure_consults_legacy_status() {
    let provider = MockStatusProvider::new()
        .with_commit(HEAD_SHA, vec![passing_run(1)], failing_status());
    let evaluator = RunStatusEvaluator::new(provider);

    let failed = evaluator
        .has_commit_failure("example", "example", HEAD_SHA, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(failed);
}

#[test]
async fn test_has_commit_failure_clean_commit() {
    let provider = MockStatusProvider::new()
        .with_commit(HEAD_SHA, vec![passing_run(1)], clean_status(2));
    let evaluator = RunStatusEvaluator::new(provider);

    let failed = evaluator
        .has_commit_failure("example", "example", HEAD_SHA, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(!failed);
}

#[test]
async fn test_has_any_statuses_ignores_aggregate_state() {
    // Zero contexts means nothing ran, even though the API still reports
    // an aggregate pending state
    let provider = MockStatusProvider::new().with_commit(HEAD_SHA, Vec::new(), empty_status());
    let evaluator = RunStatusEvaluator::new(provider);

    let has_statuses = evaluator
        .has_any_statuses("example", "example", HEAD_SHA, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert!(!has_statuses);
}

#[test]
async fn test_all_runs_returns_complete_list() {
    let provider = MockStatusProvider::new().with_commit(
        HEAD_SHA,
        vec![passing_run(1), failing_run(2), passing_run(3)],
        empty_status(),
    );
    let evaluator = RunStatusEvaluator::new(provider);

    let runs = evaluator
        .all_runs("example", "example", HEAD_SHA, &CancellationToken::new())
        .await
        .expect("Evaluation should succeed");

    assert_eq!(runs.len(), 3);
    assert_eq!(runs[1].id, 2);
}
