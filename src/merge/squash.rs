//! Squashing fixup commits and the `review/squash` status that tracks them.
//!
//! Whenever a PR's commits change, the squash status is set to pending if any
//! commit is a `fixup!`/`squash!` commit and to success otherwise. A pending
//! squash status keeps the PR from being merged by humans, and tells the
//! merge orchestrator to squash before merging.

use tracing::{info, warn};

use crate::collaborators::Collaborators;
use crate::status::SQUASH_CONTEXT;
use crate::types::{CommitState, NewStatus, PrNumber, PullRequestSnapshot, RepoId, Sha};
use crate::webhooks::HandlerError;

pub const NEEDS_SQUASH_DESCRIPTION: &str = "This PR needs to be squashed with !squash before merging";
pub const NO_SQUASH_NEEDED_DESCRIPTION: &str = "This PR does not need to be squashed";
pub const SQUASH_FAILED_DESCRIPTION: &str =
    "Failed to automatically squash the fixup! and squash! commits. Please squash manually";

/// Squashes the PR's fixup commits and force-pushes the result.
///
/// On failure the squash status of the PR head is set to `failure`, so the
/// problem is visible on the PR, and a [`HandlerError::Squash`] is returned.
/// If the status cannot be set either, that error is returned instead.
pub async fn squash_and_report_failure(
    repo: &RepoId,
    pr: &PullRequestSnapshot,
    collaborators: &Collaborators,
) -> Result<(), HandlerError> {
    let err = match collaborators.git_repos.squash(repo, pr).await {
        Ok(()) => {
            info!(repo = %repo, pr = %pr.number, "Squashed fixup commits");
            return Ok(());
        }
        Err(err) => err,
    };

    warn!(repo = %repo, pr = %pr.number, error = %err, "Squash failed");
    let status = NewStatus {
        context: SQUASH_CONTEXT.to_string(),
        state: CommitState::Failure,
        description: SQUASH_FAILED_DESCRIPTION.to_string(),
    };
    collaborators
        .repositories
        .create_status(repo, &pr.head_sha, status)
        .await
        .map_err(|e| {
            HandlerError::collaborator(
                format!("Failed to report squash failure on PR {}", pr.number),
                e,
            )
        })?;

    Err(HandlerError::Squash {
        message: format!("Failed to squash PR {}", pr.number),
        source: err,
    })
}

/// Handles a `!squash` command: squashes without any label or status gating.
pub async fn handle_squash_command(
    repo: &RepoId,
    number: PrNumber,
    collaborators: &Collaborators,
) -> Result<(), HandlerError> {
    let pr = collaborators
        .pull_requests
        .get(repo, number)
        .await
        .map_err(|e| HandlerError::collaborator(format!("Failed to get PR {}", number), e))?;

    squash_and_report_failure(repo, &pr, collaborators).await
}

/// Sets the squash status on `head_sha` from the PR's current commits.
///
/// Returns whether the PR needs squashing.
pub async fn update_squash_status(
    repo: &RepoId,
    number: PrNumber,
    head_sha: &Sha,
    collaborators: &Collaborators,
) -> Result<bool, HandlerError> {
    let commits = collaborators
        .pull_requests
        .list_commits(repo, number)
        .await
        .map_err(|e| {
            HandlerError::collaborator(format!("Failed to list commits of PR {}", number), e)
        })?;

    let needs_squash = commits.iter().any(|c| c.is_fixup());
    let (state, description) = if needs_squash {
        (CommitState::Pending, NEEDS_SQUASH_DESCRIPTION)
    } else {
        (CommitState::Success, NO_SQUASH_NEEDED_DESCRIPTION)
    };

    collaborators
        .repositories
        .create_status(
            repo,
            head_sha,
            NewStatus {
                context: SQUASH_CONTEXT.to_string(),
                state,
                description: description.to_string(),
            },
        )
        .await
        .map_err(|e| {
            HandlerError::collaborator(
                format!("Failed to set the squash status on PR {}", number),
                e,
            )
        })?;

    Ok(needs_squash)
}
