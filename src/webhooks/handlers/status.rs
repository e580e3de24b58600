//! Handler for `status` webhook events.
//!
//! A commit turning green may unblock PRs that received `!merge` while their
//! statuses were still pending. Those PRs still carry the merging label, so a
//! successful status re-runs the merge for every labelled PR containing the
//! commit.

use tracing::{debug, info};

use crate::collaborators::Collaborators;
use crate::merge::{MERGE_RETRY_LIMIT, MERGING_LABEL, RetryBudget, merge_with_retry};
use crate::types::CommitState;
use crate::webhooks::events::StatusEvent;

use super::{HandlerError, Outcome};

/// Handles a status event.
///
/// PRs are merged one after another; the first failure ends the handling and
/// is returned.
pub async fn handle_status(
    event: &StatusEvent,
    collaborators: &Collaborators,
) -> Result<Outcome, HandlerError> {
    if event.state != CommitState::Success {
        return Ok(Outcome::ignored(format!(
            "{} status '{}' on {}",
            event.state.as_api_str(),
            event.context,
            event.sha.short()
        )));
    }

    let prs = collaborators
        .issues
        .search_labeled_with_commit(&event.repo, MERGING_LABEL, &event.sha)
        .await
        .map_err(|e| {
            HandlerError::collaborator(
                format!("Failed to search for '{}' PRs at {}", MERGING_LABEL, event.sha.short()),
                e,
            )
        })?;

    if prs.is_empty() {
        debug!(repo = %event.repo, sha = %event.sha.short(), "No labelled PRs for commit");
        return Ok(Outcome::ignored(format!(
            "status on {}: no PRs labelled '{}'",
            event.sha.short(),
            MERGING_LABEL
        )));
    }

    let mut results = Vec::with_capacity(prs.len());
    for pr in prs {
        info!(repo = %event.repo, pr = %pr, context = %event.context, "Status succeeded, resuming merge");
        let outcome = merge_with_retry(
            RetryBudget::new(MERGE_RETRY_LIMIT),
            &event.repo,
            pr,
            collaborators,
        )
        .await?;
        results.push(outcome.describe(pr));
    }

    Ok(Outcome::handled(results.join("\n")))
}
