//! Handler for the `/lucidlayer` slash command.
//!
//! Acks immediately with the chosen mode; the rewrite itself runs on the
//! task supervisor and answers through `response_url`.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::Response;
use tracing::{info, warn};
use uuid::Uuid;

use super::helpers::{forbidden, ok_ephemeral};
use super::parsing::parse_slack_event;
use super::signature::verify_request;
use super::state::AppState;
use crate::core::models::{RewriteMode, RewriteRequest};
use crate::slack::response_builder::rewrite_ack_text;

pub const UNREADABLE_COMMAND_MESSAGE: &str =
    "Sorry, I couldn't read that command. Please try again.";

/// Handle a slash command from Slack.
pub fn handle_command(state: &AppState, body: &[u8], headers: &HeaderMap) -> Response {
    if !verify_request(headers, body, &state.config.slack_signing_secret) {
        return forbidden();
    }

    let command = match parse_slack_event(body) {
        Ok(command) => command,
        Err(e) => {
            warn!("Failed to parse slash command: {}", e);
            return ok_ephemeral(UNREADABLE_COMMAND_MESSAGE);
        }
    };

    if command.response_url.is_empty() {
        warn!(user_id = %command.user_id, "Slash command without response_url");
        return ok_ephemeral(UNREADABLE_COMMAND_MESSAGE);
    }

    let (mode, message) = RewriteMode::split_command_text(&command.text);
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        correlation_id = %correlation_id,
        user_id = %command.user_id,
        mode = %mode,
        "Scheduling rewrite"
    );

    let request = RewriteRequest {
        correlation_id: correlation_id.clone(),
        message,
        mode,
        user_id: command.user_id,
        response_url: command.response_url,
    };

    let rewriter = Arc::clone(&state.rewriter);
    state
        .supervisor
        .submit("rewrite", correlation_id, async move { rewriter.run(request).await });

    ok_ephemeral(&rewrite_ack_text(mode))
}
