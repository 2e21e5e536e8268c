//! Handler for Slack Events API callbacks.
//!
//! Verifies the request, answers the `url_verification` handshake, drops
//! redelivered events and hands everything else to the background
//! [`EventProcessor`](crate::worker::EventProcessor).

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::Response;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::helpers::{forbidden, ok_json, ok_status};
use super::parsing::v_str;
use super::signature::verify_request;
use super::state::AppState;
use crate::core::models::InboundEvent;

/// Handle one Events API delivery. Never waits on the scheduled work.
pub fn handle_webhook(state: &AppState, body: &[u8], headers: &HeaderMap) -> Response {
    if !verify_request(headers, body, &state.config.slack_signing_secret) {
        return forbidden();
    }

    let payload: Value = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Unparseable event payload: {}", e);
            return ok_status("ignored");
        }
    };

    if let Some(challenge) = payload.get("challenge") {
        info!("Answering url_verification challenge");
        return ok_json(json!({ "challenge": challenge }));
    }

    let Some(event_id) = v_str(&payload, &["event_id"]) else {
        info!("Event payload without event_id");
        return ok_status("ignored");
    };

    if !state.registry.check_and_insert(event_id) {
        info!(event_id, "Duplicate event delivery ignored");
        return ok_status("ignored");
    }

    let event = InboundEvent::from_callback(event_id, payload.get("event").unwrap_or(&Value::Null));
    info!(event_id, kind = ?event.kind, "Event accepted");

    let processor = Arc::clone(&state.processor);
    state
        .supervisor
        .submit("slack_event", event_id, async move { processor.process(event).await });

    ok_status("received")
}
