//! Capability traits for everything outside the process.
//!
//! The merge orchestrator never talks to GitHub or git directly; it calls
//! through these traits. Production wiring uses [`crate::github::GitHubClient`]
//! for the first three and [`crate::git::LocalGitRepos`] for [`GitRepos`].
//! Tests substitute recording doubles that inject specific error kinds.
//!
//! The traits are object safe so one set of collaborators can be shared by
//! every request handler as `Arc<dyn ...>`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::git::GitError;
use crate::github::GitHubApiError;
use crate::types::{NewStatus, PrCommit, PrNumber, PullRequestSnapshot, RepoId, Sha, StatusSet};

/// Label operations on issues (and PRs, which are issues too).
#[async_trait]
pub trait Issues: Send + Sync {
    /// Adds `label` to the issue. Adding a label that is already present is
    /// not an error.
    async fn add_label(
        &self,
        repo: &RepoId,
        number: PrNumber,
        label: &str,
    ) -> Result<(), GitHubApiError>;

    /// Removes `label` from the issue.
    async fn remove_label(
        &self,
        repo: &RepoId,
        number: PrNumber,
        label: &str,
    ) -> Result<(), GitHubApiError>;

    /// Finds open PRs carrying `label` that contain commit `sha`.
    async fn search_labeled_with_commit(
        &self,
        repo: &RepoId,
        label: &str,
        sha: &Sha,
    ) -> Result<Vec<PrNumber>, GitHubApiError>;
}

/// Pull request reads and the merge itself.
#[async_trait]
pub trait PullRequests: Send + Sync {
    /// Fetches a fresh snapshot of the PR.
    async fn get(
        &self,
        repo: &RepoId,
        number: PrNumber,
    ) -> Result<PullRequestSnapshot, GitHubApiError>;

    /// Merges the PR.
    ///
    /// Fails with [`GitHubErrorKind::StaleMergeRef`](crate::github::GitHubErrorKind::StaleMergeRef)
    /// when GitHub refuses because a branch moved since the last check.
    async fn merge(&self, repo: &RepoId, number: PrNumber) -> Result<(), GitHubApiError>;

    /// Lists the PR's commits, oldest first.
    async fn list_commits(
        &self,
        repo: &RepoId,
        number: PrNumber,
    ) -> Result<Vec<PrCommit>, GitHubApiError>;
}

/// Commit status reads and writes.
#[async_trait]
pub trait Repositories: Send + Sync {
    /// Returns the latest status of every context on `git_ref`.
    async fn get_statuses(&self, repo: &RepoId, git_ref: &Sha)
    -> Result<StatusSet, GitHubApiError>;

    /// Creates a status on `sha`.
    async fn create_status(
        &self,
        repo: &RepoId,
        sha: &Sha,
        status: NewStatus,
    ) -> Result<(), GitHubApiError>;
}

/// Local git operations.
#[async_trait]
pub trait GitRepos: Send + Sync {
    /// Squashes the PR's `fixup!`/`squash!` commits into their targets and
    /// force-pushes the result to the PR's head branch.
    async fn squash(&self, repo: &RepoId, pr: &PullRequestSnapshot) -> Result<(), GitError>;
}

/// The full set of collaborators a request handler works with.
#[derive(Clone)]
pub struct Collaborators {
    pub issues: Arc<dyn Issues>,
    pub pull_requests: Arc<dyn PullRequests>,
    pub repositories: Arc<dyn Repositories>,
    pub git_repos: Arc<dyn GitRepos>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
