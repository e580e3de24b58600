//! Webhook endpoint handler.
//!
//! Accepts GitHub webhook deliveries, validates their signature, parses them
//! and handles them inline. The response reflects the outcome: 200 for handled
//! and ignored events, an error status when authentication, parsing or a
//! collaborator call fails.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info, warn};

use super::AppState;
use crate::webhooks::{
    HandlerError, Outcome, SignatureError, authenticate, handle_event, parse_webhook,
};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub's HMAC-SHA1 signature.
const HEADER_SIGNATURE: &str = "x-hub-signature";

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Headers:
///   - `X-Hub-Signature`: `sha1=` followed by the hex HMAC-SHA1 of the body
///   - `X-GitHub-Event`: Event type (e.g., "issue_comment", "status")
///   - `X-GitHub-Delivery`: Delivery ID, only used for logging
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: Event handled, or `Ignoring ...` for events needing no action
/// - 400 Bad Request: Malformed payload for a recognised event
/// - 401 Unauthorized: Missing or empty signature
/// - 403 Forbidden: Signature mismatch
/// - 500 Internal Server Error: Squashing failed
/// - 502 Bad Gateway: A GitHub call failed
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery_id = get_header(&headers, HEADER_DELIVERY).unwrap_or("unknown");

    match process(&app_state, &headers, &body).await {
        Ok(outcome) => {
            match &outcome {
                Outcome::Handled(message) => {
                    info!(delivery_id = %delivery_id, outcome = %message, "Webhook handled")
                }
                Outcome::Ignored(reason) => {
                    debug!(delivery_id = %delivery_id, reason = %reason, "Webhook ignored")
                }
            }
            outcome.into_response()
        }
        Err(err) => {
            warn!(
                delivery_id = %delivery_id,
                status = err.status_code().as_u16(),
                error = %err,
                "Webhook failed"
            );
            err.into_response()
        }
    }
}

async fn process(
    app_state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Outcome, HandlerError> {
    // Nothing is parsed before the signature checks out.
    authenticate(body, signature_header(headers)?, app_state.webhook_secret())?;

    let Some(event_type) = get_header(headers, HEADER_EVENT) else {
        return Ok(Outcome::ignored("delivery without an event type"));
    };

    let Some(event) = parse_webhook(event_type, body)? else {
        return Ok(Outcome::ignored(format!("{} event", event_type)));
    };

    debug!(event_type = %event_type, repo = %event.repo_id(), "Handling webhook");
    handle_event(&event, app_state.collaborators()).await
}

/// The signature header, if sent. A value that is not visible ASCII cannot
/// be a `sha1=<hex>` digest, so it fails as a mismatch rather than as absent.
fn signature_header(headers: &HeaderMap) -> Result<Option<&str>, SignatureError> {
    headers
        .get(HEADER_SIGNATURE)
        .map(|v| v.to_str().map_err(|_| SignatureError::Mismatch))
        .transpose()
}

/// Extracts a header value as a string, if present and valid UTF-8.
fn get_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
