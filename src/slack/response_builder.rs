//! Response-related utilities for Slack interactions.
//!
//! This module provides standardized ways to create the payloads sent to Slack,
//! either as the immediate slash-command ack or through `response_url`.

use serde_json::{Value, json};

use crate::core::models::RewriteMode;

/// Create a JSON payload for an ephemeral response
///
/// Ephemeral messages are only visible to the user who triggered the command.
///
/// # Examples
///
/// ```
/// use lucidlayer::slack::response_builder::create_ephemeral_payload;
///
/// let payload = create_ephemeral_payload("This message is only visible to you");
/// assert_eq!(payload["response_type"], "ephemeral");
/// ```
#[must_use]
pub fn create_ephemeral_payload(text: &str) -> Value {
    json!({
        "response_type": "ephemeral",
        "text": text
    })
}

/// Ack text returned while the rewrite runs in the background.
#[must_use]
pub fn rewrite_ack_text(mode: RewriteMode) -> String {
    format!("Working on your *{mode}* rewrite... you'll see it shortly!")
}

/// Payload delivered to `response_url` once the model produced a rewrite.
#[must_use]
pub fn create_rewrite_payload(user_id: &str, mode: RewriteMode, rewritten: &str) -> Value {
    create_ephemeral_payload(&format!(
        "<@{user_id}>\n*{} version:*\n{rewritten}",
        mode.as_str().to_uppercase()
    ))
}

/// Payload delivered to `response_url` when the rewrite failed.
#[must_use]
pub fn create_rewrite_error_payload(error: &str) -> Value {
    create_ephemeral_payload(&format!("Error generating response: {error}"))
}
