//! Collaborator implementations on top of the GitHub REST API.
//!
//! Label operations and search go through octocrab's typed builders. PR,
//! commit and status routes are called directly with our own response types,
//! which keeps us independent of octocrab's model churn for the handful of
//! fields we read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collaborators::{Issues, PullRequests, Repositories};
use crate::types::{
    CommitState, CommitStatus, Mergeability, NewStatus, PrCommit, PrNumber, PullRequestSnapshot,
    RepoId, Sha, StatusSet,
};

use super::client::GitHubClient;
use super::error::GitHubApiError;

/// GitHub's maximum page size.
const PER_PAGE: u8 = 100;

// ─── Raw Response Types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    merged: Option<bool>,
    mergeable: Option<bool>,
    head: RawRef,
    base: RawRef,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    sha: String,
    #[serde(rename = "ref")]
    ref_name: String,
}

impl From<RawPullRequest> for PullRequestSnapshot {
    fn from(raw: RawPullRequest) -> Self {
        PullRequestSnapshot {
            number: PrNumber(raw.number),
            merged: raw.merged.unwrap_or(false),
            mergeable: Mergeability::from_api(raw.mergeable),
            head_sha: Sha::new(raw.head.sha),
            head_ref: raw.head.ref_name,
            base_ref: raw.base.ref_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    sha: String,
    commit: RawCommitDetail,
}

#[derive(Debug, Deserialize)]
struct RawCommitDetail {
    message: String,
}

/// Response of `GET /repos/{owner}/{repo}/commits/{ref}/status`.
///
/// `statuses` holds the latest status per context, one page of them;
/// `total_count` counts the contexts across all pages.
#[derive(Debug, Deserialize)]
struct RawCombinedStatus {
    #[serde(default)]
    total_count: Option<usize>,
    statuses: Vec<RawStatus>,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    context: String,
    state: String,
}

/// Whether a page of `page_len` entries ends a listing, given how many
/// entries have been collected so far and the total GitHub reported.
fn is_last_page(page_len: usize, collected: usize, total_count: Option<usize>) -> bool {
    page_len < usize::from(PER_PAGE) || total_count.is_some_and(|total| collected >= total)
}

fn into_status_set(statuses: Vec<RawStatus>) -> Result<StatusSet, GitHubApiError> {
    statuses
        .into_iter()
            .map(|raw| {
                let state = CommitState::from_api(&raw.state).ok_or_else(|| {
                    GitHubApiError::permanent_without_source(format!(
                        "unknown state {:?} for status context {}",
                        raw.state, raw.context
                    ))
                })?;
                Ok(CommitStatus::new(raw.context, state))
            })
            .collect()
}

#[derive(Debug, Serialize)]
struct CreateStatusRequest<'a> {
    state: &'static str,
    context: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Debug, Serialize)]
struct MergeRequest {}

#[derive(Debug, Deserialize)]
struct MergeResponse {
    merged: bool,
    message: Option<String>,
}

// ─── Issues ───────────────────────────────────────────────────────────────────

#[async_trait]
impl Issues for GitHubClient {
    async fn add_label(
        &self,
        repo: &RepoId,
        number: PrNumber,
        label: &str,
    ) -> Result<(), GitHubApiError> {
        self.inner()
            .issues(&repo.owner, &repo.repo)
            .add_labels(number.0, &[label.to_string()])
            .await
            .map(|_| ())
            .map_err(GitHubApiError::from_octocrab)
    }

    async fn remove_label(
        &self,
        repo: &RepoId,
        number: PrNumber,
        label: &str,
    ) -> Result<(), GitHubApiError> {
        self.inner()
            .issues(&repo.owner, &repo.repo)
            .remove_label(number.0, label)
            .await
            .map(|_| ())
            .map_err(GitHubApiError::from_octocrab)
    }

    async fn search_labeled_with_commit(
        &self,
        repo: &RepoId,
        label: &str,
        sha: &Sha,
    ) -> Result<Vec<PrNumber>, GitHubApiError> {
        let query = labeled_pr_query(repo, label, sha);
        debug!(query = %query, "Searching for labeled PRs");

        let page = self
            .inner()
            .search()
            .issues_and_pull_requests(&query)
            .per_page(PER_PAGE)
            .send()
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(page.items.into_iter().map(|i| PrNumber(i.number)).collect())
    }
}

/// Builds the issue search query for open PRs in `repo` with `label` that
/// contain commit `sha`.
fn labeled_pr_query(repo: &RepoId, label: &str, sha: &Sha) -> String {
    format!(
        "{} label:\"{}\" is:pr is:open repo:{}/{}",
        sha, label, repo.owner, repo.repo
    )
}

// ─── Pull Requests ────────────────────────────────────────────────────────────

#[async_trait]
impl PullRequests for GitHubClient {
    async fn get(
        &self,
        repo: &RepoId,
        number: PrNumber,
    ) -> Result<PullRequestSnapshot, GitHubApiError> {
        let route = repo.api_route(&format!("pulls/{}", number.0));
        let raw: RawPullRequest = self
            .inner()
            .get(route, None::<&()>)
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(raw.into())
    }

    async fn merge(&self, repo: &RepoId, number: PrNumber) -> Result<(), GitHubApiError> {
        let route = repo.api_route(&format!("pulls/{}/merge", number.0));
        let response: MergeResponse = self
            .inner()
            .put(route, Some(&MergeRequest {}))
            .await
            .map_err(GitHubApiError::from_merge_error)?;

        if response.merged {
            Ok(())
        } else {
            Err(GitHubApiError::permanent_without_source(format!(
                "Merge request returned merged=false: {}",
                response.message.as_deref().unwrap_or("unknown reason")
            )))
        }
    }

    async fn list_commits(
        &self,
        repo: &RepoId,
        number: PrNumber,
    ) -> Result<Vec<PrCommit>, GitHubApiError> {
        let route = repo.api_route(&format!("pulls/{}/commits", number.0));
        let mut commits = Vec::new();
        let mut page = 1u32;

        loop {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let items: Vec<RawCommit> = self
                .inner()
                .get(&route, Some(&params))
                .await
                .map_err(GitHubApiError::from_octocrab)?;

            let page_len = items.len();
            commits.extend(items.into_iter().map(|c| PrCommit {
                sha: Sha::new(c.sha),
                message: c.commit.message,
            }));

            if is_last_page(page_len, commits.len(), None) {
                break;
            }
            page += 1;
        }

        Ok(commits)
    }
}

// ─── Repositories ─────────────────────────────────────────────────────────────

#[async_trait]
impl Repositories for GitHubClient {
    async fn get_statuses(
        &self,
        repo: &RepoId,
        git_ref: &Sha,
    ) -> Result<StatusSet, GitHubApiError> {
        let route = repo.api_route(&format!("commits/{}/status", git_ref));
        let mut statuses = Vec::new();
        let mut page = 1u32;

        // A squash context or failure past the first page must still count.
        loop {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let combined: RawCombinedStatus = self
                .inner()
                .get(&route, Some(&params))
                .await
                .map_err(GitHubApiError::from_octocrab)?;

            let page_len = combined.statuses.len();
            statuses.extend(combined.statuses);
            if is_last_page(page_len, statuses.len(), combined.total_count) {
                break;
            }
            page += 1;
        }

        into_status_set(statuses)
    }

    async fn create_status(
        &self,
        repo: &RepoId,
        sha: &Sha,
        status: NewStatus,
    ) -> Result<(), GitHubApiError> {
        let route = repo.api_route(&format!("statuses/{}", sha));
        let request = CreateStatusRequest {
            state: status.state.as_api_str(),
            context: &status.context,
            description: &status.description,
        };
        let _: serde_json::Value = self
            .inner()
            .post(route, Some(&request))
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }
}
