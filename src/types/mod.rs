//! Core domain types for the review helper.
//!
//! These are the values that flow between the webhook parser, the merge
//! orchestrator and the GitHub/git collaborators.

pub mod ids;
pub mod pr;
pub mod status;

pub use ids::{PrNumber, RepoId, Sha};
pub use pr::{Mergeability, PrCommit, PullRequestSnapshot};
pub use status::{CommitState, CommitStatus, NewStatus, StatusSet};
