//! Turns webhook bodies into [`GitHubEvent`] values.
//!
//! Only `issue_comment`, `pull_request` and `status` deliveries are decoded.
//! Every other event type, and `pull_request` actions that cannot introduce
//! fixup commits, come back as `Ok(None)`. A recognised event whose body is
//! not the expected JSON is an error, which the server answers with 400.
//! Fields the bot does not read are skipped, so GitHub adding payload fields
//! never breaks parsing.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CommitState, PrNumber, RepoId, Sha};

use super::events::{
    CommentAction, GitHubEvent, IssueCommentEvent, PrAction, PullRequestEvent, StatusEvent,
};

/// Why a recognised event could not be decoded.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Not JSON, or a required field is missing or mistyped.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value (e.g., unknown state).
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Decodes `payload` according to the `X-GitHub-Event` value `event_type`.
///
/// Returns `Ok(None)` for deliveries the bot has nothing to do with.
///
/// # Examples
///
/// ```
/// use review_helper::webhooks::{GitHubEvent, parse_webhook};
///
/// let payload = br#"{
///     "action": "created",
///     "comment": { "body": "!merge" },
///     "issue": { "number": 42, "pull_request": { "url": "..." } },
///     "repository": { "owner": { "login": "owner" }, "name": "repo" }
/// }"#;
///
/// let event = parse_webhook("issue_comment", payload).unwrap();
/// assert!(matches!(event, Some(GitHubEvent::IssueComment(_))));
///
/// assert!(parse_webhook("gollum", b"not even json").unwrap().is_none());
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitHubEvent>, ParseError> {
    match event_type {
        "issue_comment" => parse_issue_comment(payload).map(|e| Some(GitHubEvent::IssueComment(e))),
        "pull_request" => parse_pull_request(payload).map(|opt| opt.map(GitHubEvent::PullRequest)),
        "status" => parse_status(payload).map(|e| Some(GitHubEvent::Status(e))),
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
// ============================================================================

/// The `repository` object every payload carries.
#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawOwner,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

impl RawRepository {
    fn into_repo_id(self) -> RepoId {
        RepoId::new(self.owner.login, self.name)
    }
}

// ============================================================================
// issue_comment event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawIssueCommentPayload {
    action: String,
    comment: RawComment,
    issue: RawIssue,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
}

fn parse_issue_comment(payload: &[u8]) -> Result<IssueCommentEvent, ParseError> {
    let raw: RawIssueCommentPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "created" => CommentAction::Created,
        "edited" => CommentAction::Edited,
        "deleted" => CommentAction::Deleted,
        _ => CommentAction::Other,
    };

    Ok(IssueCommentEvent {
        repo: raw.repository.into_repo_id(),
        action,
        issue_number: PrNumber(raw.issue.number),
        body: raw.comment.body.unwrap_or_default(),
    })
}

// ============================================================================
// pull_request event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    head: RawRef,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    sha: String,
}

fn parse_pull_request(payload: &[u8]) -> Result<Option<PullRequestEvent>, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "opened" => PrAction::Opened,
        "synchronize" => PrAction::Synchronize,
        "reopened" => PrAction::Reopened,
        // Other actions (closed, labeled, etc.) are not relevant to us
        _ => return Ok(None),
    };

    Ok(Some(PullRequestEvent {
        repo: raw.repository.into_repo_id(),
        action,
        pr_number: PrNumber(raw.pull_request.number),
        head_sha: Sha::new(raw.pull_request.head.sha),
    }))
}

// ============================================================================
// status event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawStatusPayload {
    sha: String,
    state: String,
    context: String,
    repository: RawRepository,
}

fn parse_status(payload: &[u8]) -> Result<StatusEvent, ParseError> {
    let raw: RawStatusPayload = serde_json::from_slice(payload)?;

    let state = CommitState::from_api(&raw.state).ok_or_else(|| ParseError::InvalidField {
        field: "state",
        value: raw.state.clone(),
    })?;

    Ok(StatusEvent {
        repo: raw.repository.into_repo_id(),
        sha: Sha::new(raw.sha),
        state,
        context: raw.context,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Unit tests for each event type
    // ========================================================================

    #[test]
    fn parse_issue_comment_created() {
        let payload = r#"{
            "action": "created",
            "comment": {
                "id": 12345,
                "body": "!merge",
                "user": { "id": 100, "login": "octocat" }
            },
            "issue": {
                "number": 42,
                "pull_request": { "url": "https://api.github.com/repos/owner/repo/pulls/42" }
            },
            "repository": {
                "owner": { "login": "myorg" },
                "name": "myrepo"
            }
        }"#;

        let result = parse_webhook("issue_comment", payload.as_bytes()).unwrap();
        let Some(GitHubEvent::IssueComment(event)) = result else {
            panic!("expected issue comment event, got {:?}", result);
        };

        assert_eq!(event.repo, RepoId::new("myorg", "myrepo"));
        assert_eq!(event.action, CommentAction::Created);
        assert_eq!(event.issue_number, PrNumber(42));
        assert_eq!(event.body, "!merge");
    }

    #[test]
    fn parse_issue_comment_on_plain_issue() {
        let payload = r#"{
            "action": "created",
            "comment": { "body": "hello" },
            "issue": { "number": 7 },
            "repository": { "owner": { "login": "o" }, "name": "r" }
        }"#;

        let Some(GitHubEvent::IssueComment(event)) =
            parse_webhook("issue_comment", payload.as_bytes()).unwrap()
        else {
            panic!("expected issue comment event");
        };
        assert_eq!(event.issue_number, PrNumber(7));
    }

    #[test]
    fn parse_issue_comment_null_body_is_empty() {
        let payload = r#"{
            "action": "deleted",
            "comment": { "body": null },
            "issue": { "number": 7 },
            "repository": { "owner": { "login": "o" }, "name": "r" }
        }"#;

        let Some(GitHubEvent::IssueComment(event)) =
            parse_webhook("issue_comment", payload.as_bytes()).unwrap()
        else {
            panic!("expected issue comment event");
        };
        assert_eq!(event.action, CommentAction::Deleted);
        assert_eq!(event.body, "");
    }

    #[test]
    fn parse_issue_comment_empty_object_is_error() {
        let result = parse_webhook("issue_comment", b"{}");
        assert!(matches!(result, Err(ParseError::JsonError(_))));
    }

    #[test]
    fn parse_issue_comment_invalid_json_is_error() {
        let result = parse_webhook("issue_comment", b"{not json");
        assert!(matches!(result, Err(ParseError::JsonError(_))));
    }

    #[test]
    fn parse_issue_comment_unknown_action_is_other() {
        let payload = r#"{
            "action": "pinned",
            "comment": { "body": "!merge" },
            "issue": { "number": 7 },
            "repository": { "owner": { "login": "o" }, "name": "r" }
        }"#;

        let Some(GitHubEvent::IssueComment(event)) =
            parse_webhook("issue_comment", payload.as_bytes()).unwrap()
        else {
            panic!("expected issue comment event");
        };
        assert_eq!(event.action, CommentAction::Other);
    }

    #[test]
    fn parse_pull_request_synchronize() {
        let payload = r#"{
            "action": "synchronize",
            "pull_request": {
                "number": 5,
                "head": { "sha": "0123456789abcdef0123456789abcdef01234567", "ref": "feature" }
            },
            "repository": { "owner": { "login": "o" }, "name": "r" }
        }"#;

        let Some(GitHubEvent::PullRequest(event)) =
            parse_webhook("pull_request", payload.as_bytes()).unwrap()
        else {
            panic!("expected pull request event");
        };
        assert_eq!(event.action, PrAction::Synchronize);
        assert_eq!(event.pr_number, PrNumber(5));
        assert_eq!(
            event.head_sha,
            Sha::new("0123456789abcdef0123456789abcdef01234567")
        );
    }

    #[test]
    fn parse_pull_request_irrelevant_action_is_ignored() {
        let payload = r#"{
            "action": "labeled",
            "pull_request": { "number": 5, "head": { "sha": "abc" } },
            "repository": { "owner": { "login": "o" }, "name": "r" }
        }"#;

        assert!(
            parse_webhook("pull_request", payload.as_bytes())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn parse_status_success() {
        let payload = r#"{
            "sha": "0123456789abcdef0123456789abcdef01234567",
            "state": "success",
            "context": "ci/test",
            "description": "passed",
            "repository": { "owner": { "login": "o" }, "name": "r" }
        }"#;

        let Some(GitHubEvent::Status(event)) =
            parse_webhook("status", payload.as_bytes()).unwrap()
        else {
            panic!("expected status event");
        };
        assert_eq!(event.state, CommitState::Success);
        assert_eq!(event.context, "ci/test");
    }

    #[test]
    fn parse_status_unknown_state_is_error() {
        let payload = r#"{
            "sha": "abc",
            "state": "bogus",
            "context": "ci/test",
            "repository": { "owner": { "login": "o" }, "name": "r" }
        }"#;

        let result = parse_webhook("status", payload.as_bytes());
        assert!(matches!(
            result,
            Err(ParseError::InvalidField { field: "state", .. })
        ));
    }

    #[test]
    fn unknown_event_type_is_ignored_even_with_garbage_body() {
        assert!(parse_webhook("gibberish", b"\x00\xff").unwrap().is_none());
        assert!(parse_webhook("", b"{}").unwrap().is_none());
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    proptest! {
        /// Arbitrary bytes never panic the parser, whatever the event type.
        #[test]
        fn arbitrary_payload_never_panics(
            event_type in prop_oneof![
                Just("issue_comment"),
                Just("pull_request"),
                Just("status"),
                Just("push"),
            ],
            payload: Vec<u8>
        ) {
            let _ = parse_webhook(event_type, &payload);
        }

        /// Comment bodies survive parsing verbatim.
        #[test]
        fn comment_body_preserved(body in ".{0,200}", number in 1u64..1_000_000) {
            let payload = serde_json::json!({
                "action": "created",
                "comment": { "body": body },
                "issue": { "number": number, "pull_request": {} },
                "repository": { "owner": { "login": "o" }, "name": "r" }
            });
            let bytes = serde_json::to_vec(&payload).unwrap();
            let Some(GitHubEvent::IssueComment(event)) = parse_webhook("issue_comment", &bytes).unwrap() else {
                return Err(TestCaseError::fail("expected issue comment"));
            };
            prop_assert_eq!(event.body, body);
            prop_assert_eq!(event.issue_number, PrNumber(number));
        }
    }
}
