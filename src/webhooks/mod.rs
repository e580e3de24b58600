//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA1, `X-Hub-Signature`)
//! - Event parsing into typed events
//! - Handlers that act on the parsed events through the collaborators

pub mod events;
pub mod handlers;
pub mod parser;
pub mod signature;

pub use events::{
    CommentAction, GitHubEvent, IssueCommentEvent, PrAction, PullRequestEvent, StatusEvent,
};
pub use handlers::{HandlerError, Outcome, handle_event};
pub use parser::{ParseError, parse_webhook};
pub use signature::{
    SignatureError, authenticate, compute_signature, format_signature_header,
    parse_signature_header, verify_signature,
};
