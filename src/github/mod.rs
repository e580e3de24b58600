//! GitHub API client.
//!
//! This module provides the octocrab-backed implementation of the
//! [`Issues`](crate::collaborators::Issues),
//! [`PullRequests`](crate::collaborators::PullRequests) and
//! [`Repositories`](crate::collaborators::Repositories) capabilities.
//!
//! Key features:
//! - Distinguishes transient, permanent and stale-merge-ref errors
//! - Uses raw REST routes where octocrab has no typed builder

mod api;
mod client;
mod error;

pub use client::GitHubClient;
pub use error::{GitHubApiError, GitHubErrorKind};
