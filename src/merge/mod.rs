//! Merge orchestration for the `!merge` command.
//!
//! A `!merge` comment labels the PR with [`MERGING_LABEL`] and then runs one
//! check-then-act pass:
//!
//! 1. Fetch the PR. Already merged: drop the label, done. Not mergeable
//!    (conflicting, or GitHub has not computed it yet): done, label stays.
//! 2. Fetch the head commit's statuses. Pending with the squash context
//!    pending: squash the fixup commits instead of merging. Anything else
//!    short of success: done, label stays.
//! 3. Merge. On success drop the label.
//!
//! The label is the durable signal that the PR should be merged: when a later
//! `status` event turns the head commit green, [`merge_with_retry`] runs again
//! for every labelled PR on that commit.
//!
//! # Stale merge refs
//!
//! GitHub refuses a merge whose head or base moved after mergeability was
//! computed. That refusal re-runs the whole pass from step 1 with fresh data,
//! at most [`MERGE_RETRY_LIMIT`] times. Every other failure ends the pass
//! immediately.

pub mod squash;

use tracing::{debug, info, warn};

use crate::collaborators::Collaborators;
use crate::github::GitHubApiError;
use crate::status::{AggregateState, aggregate, has_pending_squash};
use crate::types::{PrNumber, RepoId};
use crate::webhooks::HandlerError;

pub use squash::{handle_squash_command, squash_and_report_failure, update_squash_status};

/// Label marking PRs that should be merged as soon as they can be.
pub const MERGING_LABEL: &str = "merging";

/// Retries allowed after a stale merge ref refusal.
pub const MERGE_RETRY_LIMIT: u32 = 3;

/// Remaining stale merge ref retries for one merge.
///
/// Consuming a retry yields a new, smaller budget; an exhausted budget yields
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget(u32);

impl RetryBudget {
    pub fn new(retries: u32) -> Self {
        RetryBudget(retries)
    }

    pub fn remaining(self) -> u32 {
        self.0
    }

    /// Spends one retry, or returns `None` if none are left.
    pub fn consume(self) -> Option<RetryBudget> {
        self.0.checked_sub(1).map(RetryBudget)
    }
}

/// How a merge pass ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The PR was merged and the label removed.
    Merged,

    /// The PR had already been merged; the label was removed.
    AlreadyMerged,

    /// GitHub does not (yet) consider the PR mergeable. The label stays.
    NotMergeable,

    /// Statuses are not all green. The label stays.
    StatusesNotReady(AggregateState),

    /// Fixup commits were squashed instead of merging. The label stays and
    /// the merge resumes once the new head's statuses succeed.
    Squashed,
}

impl MergeOutcome {
    /// Formats the outcome for the webhook response.
    pub fn describe(self, pr: PrNumber) -> String {
        match self {
            MergeOutcome::Merged => format!("PR {} merged", pr),
            MergeOutcome::AlreadyMerged => format!("PR {} already merged", pr),
            MergeOutcome::NotMergeable => format!("PR {} is not mergeable; not merging", pr),
            MergeOutcome::StatusesNotReady(state) => {
                format!("PR {} has {} statuses; not merging", pr, state)
            }
            MergeOutcome::Squashed => format!("PR {} squashed; merge resumes after CI", pr),
        }
    }
}

/// Handles a `!merge` command: labels the PR, then runs [`merge_with_retry`]
/// with the default budget.
pub async fn handle_merge_command(
    repo: &RepoId,
    pr: PrNumber,
    collaborators: &Collaborators,
) -> Result<MergeOutcome, HandlerError> {
    collaborators
        .issues
        .add_label(repo, pr, MERGING_LABEL)
        .await
        .map_err(|e| {
            HandlerError::collaborator(
                format!("Failed to add the '{}' label to PR {}", MERGING_LABEL, pr),
                e,
            )
        })?;

    merge_with_retry(RetryBudget::new(MERGE_RETRY_LIMIT), repo, pr, collaborators).await
}

/// Runs merge passes until one finishes, retrying only stale merge refs.
///
/// Does not add the label; callers that start a merge add it first.
pub async fn merge_with_retry(
    budget: RetryBudget,
    repo: &RepoId,
    pr: PrNumber,
    collaborators: &Collaborators,
) -> Result<MergeOutcome, HandlerError> {
    let mut budget = budget;
    loop {
        match merge_pass(repo, pr, collaborators).await? {
            Pass::Finished(outcome) => return Ok(outcome),
            Pass::StaleMergeRef(source) => match budget.consume() {
                Some(rest) => {
                    warn!(
                        repo = %repo,
                        pr = %pr,
                        retries_left = rest.remaining(),
                        "Merge ref out of date, re-checking PR"
                    );
                    budget = rest;
                }
                None => return Err(HandlerError::RetryExhausted { pr, source }),
            },
        }
    }
}

enum Pass {
    Finished(MergeOutcome),
    StaleMergeRef(GitHubApiError),
}

async fn merge_pass(
    repo: &RepoId,
    number: PrNumber,
    collaborators: &Collaborators,
) -> Result<Pass, HandlerError> {
    let pr = collaborators
        .pull_requests
        .get(repo, number)
        .await
        .map_err(|e| HandlerError::collaborator(format!("Failed to get PR {}", number), e))?;

    if pr.merged {
        info!(repo = %repo, pr = %number, "PR already merged, removing label");
        remove_merging_label(repo, number, collaborators).await?;
        return Ok(Pass::Finished(MergeOutcome::AlreadyMerged));
    }
    if !pr.mergeable.is_mergeable() {
        info!(repo = %repo, pr = %number, mergeable = ?pr.mergeable, "PR not mergeable");
        return Ok(Pass::Finished(MergeOutcome::NotMergeable));
    }

    let statuses = collaborators
        .repositories
        .get_statuses(repo, &pr.head_sha)
        .await
        .map_err(|e| {
            HandlerError::collaborator(
                format!("Failed to get statuses for PR {} ({})", number, pr.head_sha.short()),
                e,
            )
        })?;

    let state = aggregate(&statuses);
    if state == AggregateState::Pending && has_pending_squash(&statuses) {
        squash_and_report_failure(repo, &pr, collaborators).await?;
        return Ok(Pass::Finished(MergeOutcome::Squashed));
    }
    if state != AggregateState::Success {
        info!(repo = %repo, pr = %number, state = %state, "PR has pending or failed statuses, not merging");
        return Ok(Pass::Finished(MergeOutcome::StatusesNotReady(state)));
    }

    debug!(repo = %repo, pr = %number, head = %pr.head_sha.short(), "Merging PR");
    match collaborators.pull_requests.merge(repo, number).await {
        Ok(()) => {
            info!(repo = %repo, pr = %number, "PR merged, removing label");
            remove_merging_label(repo, number, collaborators).await?;
            Ok(Pass::Finished(MergeOutcome::Merged))
        }
        Err(e) if e.is_stale_merge_ref() => Ok(Pass::StaleMergeRef(e)),
        Err(e) => Err(HandlerError::collaborator(
            format!("Failed to merge PR {}", number),
            e,
        )),
    }
}

async fn remove_merging_label(
    repo: &RepoId,
    pr: PrNumber,
    collaborators: &Collaborators,
) -> Result<(), HandlerError> {
    collaborators
        .issues
        .remove_label(repo, pr, MERGING_LABEL)
        .await
        .map_err(|e| {
            HandlerError::collaborator(
                format!("Failed to remove the '{}' label from PR {}", MERGING_LABEL, pr),
                e,
            )
        })
}
