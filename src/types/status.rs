//! Commit status types (GitHub's legacy Status API).

use serde::{Deserialize, Serialize};

/// State of a single commit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    /// Check is pending.
    Pending,
    /// Check succeeded.
    Success,
    /// Check failed.
    Failure,
    /// Check errored.
    Error,
}

impl CommitState {
    /// Parses GitHub's lowercase state string.
    pub fn from_api(state: &str) -> Option<Self> {
        match state {
            "pending" => Some(CommitState::Pending),
            "success" => Some(CommitState::Success),
            "failure" => Some(CommitState::Failure),
            "error" => Some(CommitState::Error),
            _ => None,
        }
    }

    /// Returns the string GitHub expects when creating a status.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            CommitState::Pending => "pending",
            CommitState::Success => "success",
            CommitState::Failure => "failure",
            CommitState::Error => "error",
        }
    }
}

/// One status entry on a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// The status context, e.g. "ci/jenkins".
    pub context: String,
    pub state: CommitState,
}

impl CommitStatus {
    pub fn new(context: impl Into<String>, state: CommitState) -> Self {
        CommitStatus {
            context: context.into(),
            state,
        }
    }
}

/// All statuses reported for one commit, in the order GitHub returned them.
pub type StatusSet = Vec<CommitStatus>;

/// A status to create on a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStatus {
    pub context: String,
    pub state: CommitState,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_strings_roundtrip() {
        for state in [
            CommitState::Pending,
            CommitState::Success,
            CommitState::Failure,
            CommitState::Error,
        ] {
            assert_eq!(CommitState::from_api(state.as_api_str()), Some(state));
        }
    }

    #[test]
    fn unknown_state_is_rejected() {
        assert_eq!(CommitState::from_api("cancelled"), None);
        assert_eq!(CommitState::from_api("SUCCESS"), None);
    }
}
