//! Command types for comment commands.

use serde::{Deserialize, Serialize};

/// A parsed command from a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Merges the PR: `!merge`
    Merge,

    /// Squashes fixup commits: `!squash`
    Squash,
}

impl Command {
    /// The literal token that triggers this command.
    pub fn token(&self) -> &'static str {
        match self {
            Command::Merge => "!merge",
            Command::Squash => "!squash",
        }
    }
}
