//! Shared test utilities: recording collaborator doubles.
//!
//! Every mock records the calls it receives and can be told to fail with a
//! specific [`GitHubErrorKind`], so tests can check both which calls the
//! orchestrator made and how it reacts to each kind of failure.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::collaborators::{Collaborators, GitRepos, Issues, PullRequests, Repositories};
use crate::git::GitError;
use crate::github::{GitHubApiError, GitHubErrorKind};
use crate::types::{
    Mergeability, NewStatus, PrCommit, PrNumber, PullRequestSnapshot, RepoId, Sha, StatusSet,
};

pub fn repo() -> RepoId {
    RepoId::new("octocat", "hello-world")
}

/// An open, mergeable PR whose head SHA is derived from its number.
pub fn pr_snapshot(number: PrNumber) -> PullRequestSnapshot {
    PullRequestSnapshot {
        number,
        merged: false,
        mergeable: Mergeability::Mergeable,
        head_sha: head_sha_for(number),
        head_ref: format!("feature-{}", number.0),
        base_ref: "main".to_string(),
    }
}

pub fn head_sha_for(number: PrNumber) -> Sha {
    Sha::new(format!("{:040x}", number.0))
}

fn error(kind: GitHubErrorKind, pr: PrNumber) -> GitHubApiError {
    match kind {
        GitHubErrorKind::Transient => GitHubApiError::transient_without_source("injected"),
        GitHubErrorKind::Permanent => GitHubApiError::permanent_without_source("injected"),
        GitHubErrorKind::StaleMergeRef => GitHubApiError::stale_merge_ref(pr),
    }
}

fn check(failure: &Mutex<Option<GitHubErrorKind>>, pr: PrNumber) -> Result<(), GitHubApiError> {
    match *failure.lock().unwrap() {
        Some(kind) => Err(error(kind, pr)),
        None => Ok(()),
    }
}

// ─── Issues ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockIssues {
    added: Mutex<Vec<(PrNumber, String)>>,
    removed: Mutex<Vec<(PrNumber, String)>>,
    searches: Mutex<Vec<(String, Sha)>>,
    search_results: Mutex<Vec<PrNumber>>,
    error_on_add: Mutex<Option<GitHubErrorKind>>,
    error_on_remove: Mutex<Option<GitHubErrorKind>>,
    error_on_search: Mutex<Option<GitHubErrorKind>>,
}

impl MockIssues {
    pub fn added_labels(&self) -> Vec<(PrNumber, String)> {
        self.added.lock().unwrap().clone()
    }

    pub fn removed_labels(&self) -> Vec<(PrNumber, String)> {
        self.removed.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<(String, Sha)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn set_search_results(&self, prs: Vec<PrNumber>) {
        *self.search_results.lock().unwrap() = prs;
    }

    pub fn fail_add_label(&self, kind: GitHubErrorKind) {
        *self.error_on_add.lock().unwrap() = Some(kind);
    }

    pub fn fail_remove_label(&self, kind: GitHubErrorKind) {
        *self.error_on_remove.lock().unwrap() = Some(kind);
    }

    pub fn fail_search(&self, kind: GitHubErrorKind) {
        *self.error_on_search.lock().unwrap() = Some(kind);
    }

    fn calls(&self) -> usize {
        self.added.lock().unwrap().len()
            + self.removed.lock().unwrap().len()
            + self.searches.lock().unwrap().len()
    }
}

#[async_trait]
impl Issues for MockIssues {
    async fn add_label(
        &self,
        _repo: &RepoId,
        number: PrNumber,
        label: &str,
    ) -> Result<(), GitHubApiError> {
        self.added.lock().unwrap().push((number, label.to_string()));
        check(&self.error_on_add, number)
    }

    async fn remove_label(
        &self,
        _repo: &RepoId,
        number: PrNumber,
        label: &str,
    ) -> Result<(), GitHubApiError> {
        self.removed.lock().unwrap().push((number, label.to_string()));
        check(&self.error_on_remove, number)
    }

    async fn search_labeled_with_commit(
        &self,
        _repo: &RepoId,
        label: &str,
        sha: &Sha,
    ) -> Result<Vec<PrNumber>, GitHubApiError> {
        self.searches
            .lock()
            .unwrap()
            .push((label.to_string(), sha.clone()));
        check(&self.error_on_search, PrNumber(0))?;
        Ok(self.search_results.lock().unwrap().clone())
    }
}

// ─── Pull Requests ────────────────────────────────────────────────────────────

/// PR double.
///
/// `get` answers from the per-PR queue first, then from the snapshot given to
/// [`set_pr`](Self::set_pr). `merge` answers from the result queue, succeeding
/// once it is empty.
#[derive(Default)]
pub struct MockPullRequests {
    prs: Mutex<HashMap<PrNumber, PullRequestSnapshot>>,
    queued_prs: Mutex<HashMap<PrNumber, VecDeque<PullRequestSnapshot>>>,
    commits: Mutex<HashMap<PrNumber, Vec<PrCommit>>>,
    merge_results: Mutex<VecDeque<Result<(), GitHubErrorKind>>>,
    get_calls: Mutex<Vec<PrNumber>>,
    merge_calls: Mutex<Vec<PrNumber>>,
    list_commits_calls: Mutex<Vec<PrNumber>>,
    error_on_get: Mutex<Option<GitHubErrorKind>>,
    error_on_list_commits: Mutex<Option<GitHubErrorKind>>,
}

impl MockPullRequests {
    pub fn set_pr(&self, pr: PullRequestSnapshot) {
        self.prs.lock().unwrap().insert(pr.number, pr);
    }

    pub fn queue_pr(&self, pr: PullRequestSnapshot) {
        self.queued_prs
            .lock()
            .unwrap()
            .entry(pr.number)
            .or_default()
            .push_back(pr);
    }

    pub fn set_commits(&self, number: PrNumber, commits: Vec<PrCommit>) {
        self.commits.lock().unwrap().insert(number, commits);
    }

    pub fn push_merge_result(&self, result: Result<(), GitHubErrorKind>) {
        self.merge_results.lock().unwrap().push_back(result);
    }

    pub fn get_calls(&self) -> Vec<PrNumber> {
        self.get_calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<PrNumber> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn list_commits_calls(&self) -> Vec<PrNumber> {
        self.list_commits_calls.lock().unwrap().clone()
    }

    pub fn fail_get(&self, kind: GitHubErrorKind) {
        *self.error_on_get.lock().unwrap() = Some(kind);
    }

    pub fn fail_list_commits(&self, kind: GitHubErrorKind) {
        *self.error_on_list_commits.lock().unwrap() = Some(kind);
    }

    fn calls(&self) -> usize {
        self.get_calls.lock().unwrap().len()
            + self.merge_calls.lock().unwrap().len()
            + self.list_commits_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PullRequests for MockPullRequests {
    async fn get(
        &self,
        _repo: &RepoId,
        number: PrNumber,
    ) -> Result<PullRequestSnapshot, GitHubApiError> {
        self.get_calls.lock().unwrap().push(number);
        check(&self.error_on_get, number)?;

        let queued = self
            .queued_prs
            .lock()
            .unwrap()
            .get_mut(&number)
            .and_then(|q| q.pop_front());
        if let Some(pr) = queued {
            return Ok(pr);
        }
        self.prs
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or_else(|| GitHubApiError::permanent_without_source("Not Found"))
    }

    async fn merge(&self, _repo: &RepoId, number: PrNumber) -> Result<(), GitHubApiError> {
        self.merge_calls.lock().unwrap().push(number);
        match self.merge_results.lock().unwrap().pop_front() {
            Some(Err(kind)) => Err(error(kind, number)),
            Some(Ok(())) | None => Ok(()),
        }
    }

    async fn list_commits(
        &self,
        _repo: &RepoId,
        number: PrNumber,
    ) -> Result<Vec<PrCommit>, GitHubApiError> {
        self.list_commits_calls.lock().unwrap().push(number);
        check(&self.error_on_list_commits, number)?;
        Ok(self
            .commits
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .unwrap_or_default())
    }
}

// ─── Repositories ─────────────────────────────────────────────────────────────

/// Status double. Commits without configured statuses have none.
#[derive(Default)]
pub struct MockRepositories {
    statuses: Mutex<HashMap<Sha, StatusSet>>,
    get_statuses_calls: Mutex<Vec<Sha>>,
    created: Mutex<Vec<(Sha, NewStatus)>>,
    error_on_get_statuses: Mutex<Option<GitHubErrorKind>>,
    error_on_create_status: Mutex<Option<GitHubErrorKind>>,
}

impl MockRepositories {
    pub fn set_statuses(&self, sha: &Sha, statuses: StatusSet) {
        self.statuses.lock().unwrap().insert(sha.clone(), statuses);
    }

    pub fn get_statuses_calls(&self) -> Vec<Sha> {
        self.get_statuses_calls.lock().unwrap().clone()
    }

    pub fn created_statuses(&self) -> Vec<(Sha, NewStatus)> {
        self.created.lock().unwrap().clone()
    }

    pub fn fail_get_statuses(&self, kind: GitHubErrorKind) {
        *self.error_on_get_statuses.lock().unwrap() = Some(kind);
    }

    pub fn fail_create_status(&self, kind: GitHubErrorKind) {
        *self.error_on_create_status.lock().unwrap() = Some(kind);
    }

    fn calls(&self) -> usize {
        self.get_statuses_calls.lock().unwrap().len() + self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl Repositories for MockRepositories {
    async fn get_statuses(
        &self,
        _repo: &RepoId,
        git_ref: &Sha,
    ) -> Result<StatusSet, GitHubApiError> {
        self.get_statuses_calls.lock().unwrap().push(git_ref.clone());
        check(&self.error_on_get_statuses, PrNumber(0))?;
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(git_ref)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_status(
        &self,
        _repo: &RepoId,
        sha: &Sha,
        status: NewStatus,
    ) -> Result<(), GitHubApiError> {
        self.created.lock().unwrap().push((sha.clone(), status));
        check(&self.error_on_create_status, PrNumber(0))
    }
}

// ─── Git ──────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockGitRepos {
    squash_calls: Mutex<Vec<PrNumber>>,
    fail: Mutex<bool>,
}

impl MockGitRepos {
    pub fn squash_calls(&self) -> Vec<PrNumber> {
        self.squash_calls.lock().unwrap().clone()
    }

    /// Makes every squash stop on a rebase conflict.
    pub fn fail_squash(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl GitRepos for MockGitRepos {
    async fn squash(&self, _repo: &RepoId, pr: &PullRequestSnapshot) -> Result<(), GitError> {
        self.squash_calls.lock().unwrap().push(pr.number);
        if *self.fail.lock().unwrap() {
            Err(GitError::RebaseConflict {
                details: "CONFLICT (content): Merge conflict in src/lib.rs".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

// ─── Bundle ───────────────────────────────────────────────────────────────────

/// All four doubles, kept as concrete types for inspection.
#[derive(Default)]
pub struct MockCollaborators {
    pub issues: Arc<MockIssues>,
    pub pull_requests: Arc<MockPullRequests>,
    pub repositories: Arc<MockRepositories>,
    pub git_repos: Arc<MockGitRepos>,
}

impl MockCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    /// The doubles as the trait objects handlers work with.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            issues: self.issues.clone(),
            pull_requests: self.pull_requests.clone(),
            repositories: self.repositories.clone(),
            git_repos: self.git_repos.clone(),
        }
    }

    /// Total number of calls made to any collaborator.
    pub fn total_calls(&self) -> usize {
        self.issues.calls()
            + self.pull_requests.calls()
            + self.repositories.calls()
            + self.git_repos.squash_calls().len()
    }
}
