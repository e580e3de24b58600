//! Handler for `issue_comment` webhook events.
//!
//! A comment consisting of exactly one command token (after trimming) runs
//! that command on the PR the comment belongs to:
//! - `!merge` - label the PR and merge it once it is ready
//! - `!squash` - squash the PR's fixup commits now

use tracing::info;

use crate::collaborators::Collaborators;
use crate::commands::{Command, parse_command};
use crate::merge::{handle_merge_command, handle_squash_command};
use crate::webhooks::events::{CommentAction, IssueCommentEvent};

use super::{HandlerError, Outcome};

/// Handles an issue comment event.
///
/// Only newly created comments are acted on; edits and deletions never
/// re-run a command.
pub async fn handle_issue_comment(
    event: &IssueCommentEvent,
    collaborators: &Collaborators,
) -> Result<Outcome, HandlerError> {
    if event.action != CommentAction::Created {
        return Ok(Outcome::ignored(format!(
            "{:?} comment on {}",
            event.action, event.issue_number
        )));
    }

    let Some(command) = parse_command(&event.body) else {
        return Ok(Outcome::ignored(format!(
            "comment on {} without a command",
            event.issue_number
        )));
    };

    let pr = event.issue_number;
    info!(repo = %event.repo, pr = %pr, command = command.token(), "Received command");

    match command {
        Command::Merge => {
            let outcome = handle_merge_command(&event.repo, pr, collaborators).await?;
            Ok(Outcome::handled(outcome.describe(pr)))
        }
        Command::Squash => {
            handle_squash_command(&event.repo, pr, collaborators).await?;
            Ok(Outcome::handled(format!("PR {} squashed", pr)))
        }
    }
}
