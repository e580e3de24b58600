//! Pull request views as returned by the GitHub collaborator.

use serde::{Deserialize, Serialize};

use super::ids::{PrNumber, Sha};

/// Whether GitHub considers a PR mergeable.
///
/// GitHub computes mergeability lazily in the background; until it is done the
/// API reports `null`, which we represent as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mergeability {
    Mergeable,
    Conflicting,
    Unknown,
}

impl Mergeability {
    /// Maps GitHub's nullable `mergeable` field.
    pub fn from_api(mergeable: Option<bool>) -> Self {
        match mergeable {
            Some(true) => Mergeability::Mergeable,
            Some(false) => Mergeability::Conflicting,
            None => Mergeability::Unknown,
        }
    }

    /// Only a definite "yes" counts; `Unknown` is not mergeable.
    pub fn is_mergeable(&self) -> bool {
        matches!(self, Mergeability::Mergeable)
    }
}

/// A read-only view of a pull request.
///
/// Snapshots are fetched fresh for every orchestration step and never reused
/// across merge retries: mergeability and the head commit can change between
/// attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSnapshot {
    /// The PR number.
    pub number: PrNumber,
    /// Whether the PR has already been merged.
    pub merged: bool,
    /// Whether the PR can currently be merged.
    pub mergeable: Mergeability,
    /// The head commit SHA.
    pub head_sha: Sha,
    /// The head branch name.
    pub head_ref: String,
    /// The base branch name.
    pub base_ref: String,
}

/// One commit on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrCommit {
    pub sha: Sha,
    pub message: String,
}

impl PrCommit {
    /// Returns true for commits created with `git commit --fixup` or `--squash`.
    pub fn is_fixup(&self) -> bool {
        self.message.starts_with("fixup!") || self.message.starts_with("squash!")
    }
}
