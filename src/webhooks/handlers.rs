//! Event handlers for GitHub webhook events.
//!
//! Each handler takes an authenticated, parsed event plus the collaborators
//! and returns either an [`Outcome`] (always HTTP 200) or a [`HandlerError`]
//! that maps to an HTTP error status.
//!
//! # Event Types
//!
//! | Event | Handler |
//! |-------|---------|
//! | `issue_comment` | `handle_issue_comment` - `!merge` and `!squash` commands |
//! | `pull_request` | `handle_pull_request` - fixup-commit check on opened, synchronize, reopened |
//! | `status` | `handle_status` - resume labelled merges once a commit goes green |

mod issue_comment;
mod pull_request;
mod status;

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::collaborators::Collaborators;
use crate::git::GitError;
use crate::github::GitHubApiError;
use crate::types::PrNumber;
use crate::webhooks::{GitHubEvent, ParseError, SignatureError};

pub use issue_comment::handle_issue_comment;
pub use pull_request::handle_pull_request;
pub use status::handle_status;

/// Errors that end the handling of a webhook with a non-200 response.
///
/// None of these are retried by the handler itself. The only retry in the
/// system is the stale merge ref loop inside [`crate::merge::merge_with_retry`],
/// which surfaces here as [`HandlerError::RetryExhausted`] once its budget
/// runs out.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The signature header was missing or empty.
    #[error("missing signature")]
    Unauthorized,

    /// The signature did not match the payload.
    #[error("signature mismatch")]
    Forbidden,

    /// The payload of a recognised event could not be parsed.
    #[error("malformed payload: {0}")]
    BadRequest(#[from] ParseError),

    /// A GitHub call failed.
    #[error("{message}: {source}")]
    Collaborator {
        message: String,
        #[source]
        source: GitHubApiError,
    },

    /// The merge kept failing on a stale merge ref after every retry.
    #[error("Failed to merge PR {pr}: merge ref still out of date after retries: {source}")]
    RetryExhausted {
        pr: PrNumber,
        #[source]
        source: GitHubApiError,
    },

    /// Squashing the PR's fixup commits failed.
    #[error("{message}: {source}")]
    Squash {
        message: String,
        #[source]
        source: GitError,
    },
}

impl HandlerError {
    /// Wraps a failed GitHub call with a message naming what was attempted.
    pub fn collaborator(message: impl Into<String>, source: GitHubApiError) -> Self {
        HandlerError::Collaborator {
            message: message.into(),
            source,
        }
    }

    /// The HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Unauthorized => StatusCode::UNAUTHORIZED,
            HandlerError::Forbidden => StatusCode::FORBIDDEN,
            HandlerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HandlerError::Collaborator { .. } | HandlerError::RetryExhausted { .. } => {
                StatusCode::BAD_GATEWAY
            }
            HandlerError::Squash { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SignatureError> for HandlerError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::Missing => HandlerError::Unauthorized,
            SignatureError::Mismatch => HandlerError::Forbidden,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Result of a successfully handled webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event was acted on.
    Handled(String),

    /// The event needed no action.
    Ignored(String),
}

impl Outcome {
    pub fn handled(message: impl Into<String>) -> Self {
        Outcome::Handled(message.into())
    }

    pub fn ignored(reason: impl Into<String>) -> Self {
        Outcome::Ignored(reason.into())
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Outcome::Ignored(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Handled(message) => write!(f, "{}", message),
            Outcome::Ignored(reason) => write!(f, "Ignoring {}", reason),
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.to_string()).into_response()
    }
}

/// Handles a GitHub webhook event.
///
/// This is the main entry point for event handling. It dispatches to the
/// appropriate handler based on the event type.
pub async fn handle_event(
    event: &GitHubEvent,
    collaborators: &Collaborators,
) -> Result<Outcome, HandlerError> {
    match event {
        GitHubEvent::IssueComment(e) => handle_issue_comment(e, collaborators).await,
        GitHubEvent::PullRequest(e) => handle_pull_request(e, collaborators).await,
        GitHubEvent::Status(e) => handle_status(e, collaborators).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            HandlerError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(HandlerError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            HandlerError::collaborator("Failed", GitHubApiError::transient_without_source("x"))
                .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            HandlerError::RetryExhausted {
                pr: PrNumber(3),
                source: GitHubApiError::stale_merge_ref(PrNumber(3)),
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            HandlerError::Squash {
                message: "Failed".to_string(),
                source: GitError::RebaseConflict {
                    details: "conflict".to_string()
                },
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn signature_errors_map_to_auth_errors() {
        assert!(matches!(
            HandlerError::from(SignatureError::Missing),
            HandlerError::Unauthorized
        ));
        assert!(matches!(
            HandlerError::from(SignatureError::Mismatch),
            HandlerError::Forbidden
        ));
    }

    #[test]
    fn retry_exhausted_names_the_pr() {
        let err = HandlerError::RetryExhausted {
            pr: PrNumber(17),
            source: GitHubApiError::stale_merge_ref(PrNumber(17)),
        };
        assert!(err.to_string().starts_with("Failed to merge PR #17"));
    }

    #[test]
    fn ignored_outcome_text() {
        let outcome = Outcome::ignored("event type push");
        assert!(outcome.is_ignored());
        assert_eq!(outcome.to_string(), "Ignoring event type push");
        assert_eq!(Outcome::handled("done").to_string(), "done");
    }
}
