//! Classified GitHub API failures.
//!
//! Every GitHub call made through the collaborators fails with a
//! [`GitHubApiError`] whose [`GitHubErrorKind`] is decided once, here, from the
//! HTTP status and GitHub's message. Callers match on the kind and never on
//! message text.
//!
//! - **Transient** errors are the kind a later attempt could succeed at (5xx,
//!   rate limits, network failures)
//! - **Permanent** errors need a human (most 4xx, merge conflicts, not found)
//! - **StaleMergeRef** is the merge endpoint rejecting a merge because a branch
//!   moved after mergeability was computed. The merge orchestrator re-checks
//!   the PR from scratch and tries again, within its retry budget.

use std::fmt;
use thiserror::Error;

use crate::types::PrNumber;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// 5xx, 429, a throttling 403, or no response at all because of a
    /// transport failure.
    Transient,

    /// Any other 4xx (not found, forbidden, "Pull Request is not mergeable"),
    /// or a response that could not be decoded.
    Permanent,

    /// The merge was refused because the head or base branch was modified
    /// after GitHub last computed the merge ref (HTTP 405/409, "... branch was
    /// modified. Review and try the merge again.").
    ///
    /// Re-issuing the same merge call is pointless until mergeability and
    /// statuses have been re-evaluated against the new ref.
    StaleMergeRef,
}

/// A failed GitHub call and what kind of failure it was.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The kind of error.
    pub kind: GitHubErrorKind,

    /// Absent when GitHub never answered.
    pub status_code: Option<u16>,

    /// GitHub's `message`, or the transport error text.
    pub message: String,

    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates a permanent error without an octocrab source.
    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transient error without an octocrab source.
    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a stale merge ref error for `pr` without an octocrab source.
    pub fn stale_merge_ref(pr: PrNumber) -> Self {
        Self {
            kind: GitHubErrorKind::StaleMergeRef,
            status_code: Some(405),
            message: format!("merge ref of PR {} is out of date", pr),
            source: None,
        }
    }

    /// Returns true if the merge should be re-evaluated and retried.
    pub fn is_stale_merge_ref(&self) -> bool {
        self.kind == GitHubErrorKind::StaleMergeRef
    }

    /// Categorizes an octocrab error from any endpoint other than merge.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let (status_code, message) = describe(&err);
        let kind = classify(status_code, &message);
        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    /// Categorizes an octocrab error from the merge endpoint.
    ///
    /// Identical to [`from_octocrab`](Self::from_octocrab) except that a
    /// "branch was modified" refusal becomes [`GitHubErrorKind::StaleMergeRef`].
    pub fn from_merge_error(err: octocrab::Error) -> Self {
        let (status_code, message) = describe(&err);
        let kind = if is_stale_merge_ref(status_code, &message) {
            GitHubErrorKind::StaleMergeRef
        } else {
            classify(status_code, &message)
        };
        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }
}

/// Pulls the HTTP status and GitHub's message out of an octocrab error.
///
/// Only `Error::GitHub` carries a response from GitHub; everything else
/// (transport, serde, URL building) has no status code.
fn describe(err: &octocrab::Error) -> (Option<u16>, String) {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            (Some(source.status_code.as_u16()), source.message.clone())
        }
        other => (None, other.to_string()),
    }
}

fn classify(status_code: Option<u16>, message: &str) -> GitHubErrorKind {
    match status_code {
        Some(429) => GitHubErrorKind::Transient,
        Some(403) if is_rate_limit_error(message) => GitHubErrorKind::Transient,
        Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
        Some(_) => GitHubErrorKind::Permanent,
        None if is_network_error(message) => GitHubErrorKind::Transient,
        None => GitHubErrorKind::Permanent,
    }
}

/// GitHub answers 405 (or 409 on some API versions) with "Head branch was
/// modified. Review and try the merge again." or the "Base branch" variant.
fn is_stale_merge_ref(status_code: Option<u16>, message: &str) -> bool {
    matches!(status_code, Some(405) | Some(409))
        && message.to_lowercase().contains("branch was modified")
}

/// Phrases GitHub uses when a 403 is throttling rather than a denial.
const RATE_LIMIT_PHRASES: &[&str] = &["rate limit", "api rate", "abuse detection"];

/// Phrases hyper and reqwest use for transport failures.
const NETWORK_PHRASES: &[&str] = &["timeout", "timed out", "connection", "network", "dns"];

fn mentions_any(message: &str, phrases: &[&str]) -> bool {
    let message = message.to_lowercase();
    phrases.iter().any(|phrase| message.contains(phrase))
}

fn is_rate_limit_error(message: &str) -> bool {
    mentions_any(message, RATE_LIMIT_PHRASES)
}

fn is_network_error(message: &str) -> bool {
    mentions_any(message, NETWORK_PHRASES)
}
