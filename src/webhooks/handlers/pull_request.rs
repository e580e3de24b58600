//! Handler for `pull_request` webhook events.
//!
//! Every time a PR is opened, reopened or receives new commits, its squash
//! status is recomputed from its commit list.

use crate::collaborators::Collaborators;
use crate::merge::update_squash_status;
use crate::webhooks::events::PullRequestEvent;

use super::{HandlerError, Outcome};

/// Handles a pull request event.
///
/// The parser only produces events for `opened`, `synchronize` and
/// `reopened`, so every event here gets its squash status updated.
pub async fn handle_pull_request(
    event: &PullRequestEvent,
    collaborators: &Collaborators,
) -> Result<Outcome, HandlerError> {
    let needs_squash =
        update_squash_status(&event.repo, event.pr_number, &event.head_sha, collaborators).await?;

    Ok(Outcome::handled(if needs_squash {
        format!("PR {} needs squashing", event.pr_number)
    } else {
        format!("PR {} does not need squashing", event.pr_number)
    }))
}
