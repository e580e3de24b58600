//! The three deliveries the bot acts on, decoded.
//!
//! Typed representations of the webhook events the bot handles, carrying only
//! the fields we need.
//!
//! - `issue_comment` - Command parsing (`!merge`, `!squash`)
//! - `pull_request` - Fixup-commit detection on opened/synchronized PRs
//! - `status` - Re-triggering merges once CI goes green

use serde::{Deserialize, Serialize};

use crate::types::{CommitState, PrNumber, RepoId, Sha};

/// A delivery the bot has a handler for.
///
/// Unknown or irrelevant events are represented by returning `None` from the
/// parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubEvent {
    /// An issue or PR comment was created, edited, or deleted.
    IssueComment(IssueCommentEvent),

    /// A pull request was opened, reopened or received new commits.
    PullRequest(PullRequestEvent),

    /// A commit status was updated.
    Status(StatusEvent),
}

impl GitHubEvent {
    /// Repository every follow-up call is made against.
    pub fn repo_id(&self) -> &RepoId {
        match self {
            GitHubEvent::IssueComment(e) => &e.repo,
            GitHubEvent::PullRequest(e) => &e.repo,
            GitHubEvent::Status(e) => &e.repo,
        }
    }
}

/// Action performed on an issue comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    /// Comment was created.
    Created,
    /// Comment was edited.
    Edited,
    /// Comment was deleted.
    Deleted,
    /// Any action GitHub adds later, such as `pinned`.
    #[serde(other)]
    Other,
}

/// A comment on an issue or PR, possibly holding a command.
///
/// Comments on the PR conversation tab arrive as issue comments, with the
/// issue number doubling as the PR number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    /// The repository.
    pub repo: RepoId,

    /// The action that triggered this event.
    pub action: CommentAction,

    /// The issue number (equal to the PR number for PR comments).
    pub issue_number: PrNumber,

    /// The comment body text. Empty for deleted comments.
    pub body: String,
}

/// Action performed on a pull request that the bot reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    /// PR was opened.
    Opened,
    /// PR head was updated (new commits pushed).
    Synchronize,
    /// PR was reopened.
    Reopened,
}

/// A pull request event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    /// The repository.
    pub repo: RepoId,

    /// The action that triggered this event.
    pub action: PrAction,

    /// The PR number.
    pub pr_number: PrNumber,

    /// The current head SHA of the PR branch.
    pub head_sha: Sha,
}

/// A commit status event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// The repository.
    pub repo: RepoId,

    /// The commit SHA this status is for.
    pub sha: Sha,

    /// The state of the status.
    pub state: CommitState,

    /// The context (name) of the status check.
    pub context: String,
}
