//! Aggregation of per-commit status checks.
//!
//! GitHub reports one status per context on a commit. Before merging we fold
//! them into a single overall state, and we look for the squash context in
//! particular: while it is pending the PR still has fixup commits that the bot
//! can squash itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{CommitState, CommitStatus};

/// The status context the bot reports fixup-commit state under.
pub const SQUASH_CONTEXT: &str = "review/squash";

/// The rollup of all statuses on a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateState {
    Pending,
    Success,
    Failure,
}

impl fmt::Display for AggregateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateState::Pending => write!(f, "pending"),
            AggregateState::Success => write!(f, "successful"),
            AggregateState::Failure => write!(f, "failed"),
        }
    }
}

/// Folds a commit's statuses into one state.
///
/// Precedence: any `failure` or `error` wins, then any `pending`; an empty set
/// or one where every status succeeded is `success`.
///
/// # Examples
///
/// ```
/// use review_helper::status::{AggregateState, aggregate};
/// use review_helper::types::{CommitState, CommitStatus};
///
/// let statuses = vec![
///     CommitStatus::new("ci/test", CommitState::Success),
///     CommitStatus::new("ci/lint", CommitState::Pending),
/// ];
/// assert_eq!(aggregate(&statuses), AggregateState::Pending);
/// assert_eq!(aggregate(&[]), AggregateState::Success);
/// ```
pub fn aggregate(statuses: &[CommitStatus]) -> AggregateState {
    let mut pending = false;
    for status in statuses {
        match status.state {
            CommitState::Failure | CommitState::Error => return AggregateState::Failure,
            CommitState::Pending => pending = true,
            CommitState::Success => {}
        }
    }
    if pending {
        AggregateState::Pending
    } else {
        AggregateState::Success
    }
}

/// Returns true if the squash context is present and pending.
pub fn has_pending_squash(statuses: &[CommitStatus]) -> bool {
    statuses
        .iter()
        .any(|s| s.context == SQUASH_CONTEXT && s.state == CommitState::Pending)
}
