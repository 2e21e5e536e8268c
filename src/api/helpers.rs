//! Common helper functions for API handlers.
//!
//! Response builders shared by the webhook, command and health routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::slack::response_builder::create_ephemeral_payload;

pub const HEALTH_TEXT: &str = "LucidLayer backend is alive!";

/// Returns a 200 OK response with a JSON body.
#[must_use]
pub fn ok_json(body: Value) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

/// Returns a 200 OK response of the form `{"status": <status>}`.
#[must_use]
pub fn ok_status(status: &str) -> Response {
    ok_json(json!({ "status": status }))
}

/// Returns a 200 OK response with an ephemeral Slack message.
#[must_use]
pub fn ok_ephemeral(text: &str) -> Response {
    ok_json(create_ephemeral_payload(text))
}

/// Returns a 403 plain-text response for requests that fail verification.
#[must_use]
pub fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Invalid signature").into_response()
}
