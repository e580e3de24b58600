//! Review Helper - A GitHub bot that merges and squashes pull requests on
//! reviewer comment commands.
//!
//! Reviewers comment `!merge` to merge a PR once its statuses are green, or
//! `!squash` to fold `fixup!`/`squash!` commits into their targets. PRs still
//! containing such commits get a failing squash status so they cannot be merged
//! by accident.

pub mod collaborators;
pub mod commands;
pub mod config;
pub mod git;
pub mod github;
pub mod merge;
pub mod server;
pub mod status;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub mod test_utils;
