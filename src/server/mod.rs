//! HTTP server for the review helper.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries and handles them inline
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

pub mod webhook;

pub use webhook::webhook_handler;

use crate::collaborators::Collaborators;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Webhook secret for HMAC-SHA1 signature verification.
    webhook_secret: Vec<u8>,

    /// GitHub and git access shared by every request.
    collaborators: Collaborators,
}

impl AppState {
    pub fn new(webhook_secret: impl Into<Vec<u8>>, collaborators: Collaborators) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret: webhook_secret.into(),
                collaborators,
            }),
        }
    }

    /// Returns the webhook secret.
    pub fn webhook_secret(&self) -> &[u8] {
        &self.inner.webhook_secret
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.inner.collaborators
    }
}

/// Liveness probe.
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
