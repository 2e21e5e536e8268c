use axum::http::HeaderMap;
use serde_json::Value;

use crate::errors::BotError;
use crate::slack::command_parser::{SlackCommandEvent, parse_form_data};

pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Parse a signed slash-command body.
pub fn parse_slack_event(body: &[u8]) -> Result<SlackCommandEvent, BotError> {
    let payload = std::str::from_utf8(body)
        .map_err(|e| BotError::ParseError(format!("Command body is not UTF-8: {}", e)))?;
    parse_form_data(payload)
        .map_err(|e| BotError::ParseError(format!("Failed to parse form data: {}", e)))
}

/// Case-insensitive header lookup; non-UTF-8 values count as missing.
pub fn get_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
