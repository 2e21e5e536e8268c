use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
use tracing::error;

use super::parsing::{SIGNATURE_HEADER, TIMESTAMP_HEADER, get_header_value};

type HmacSha256 = Hmac<Sha256>;

/// Requests older than this are treated as replays.
pub const MAX_REQUEST_AGE_SECS: u64 = 300;

/// Tolerated clock skew for timestamps from the future.
pub const MAX_CLOCK_SKEW_SECS: u64 = 60;

pub fn verify_slack_signature(
    request_body: &[u8],
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
) -> bool {
    let now_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    verify_slack_signature_at(request_body, timestamp, signature, signing_secret, now_secs)
}

/// Same as [`verify_slack_signature`] with an explicit clock.
pub fn verify_slack_signature_at(
    request_body: &[u8],
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
    now_secs: u64,
) -> bool {
    let Ok(ts) = timestamp.parse::<u64>() else {
        error!("Unparseable X-Slack-Request-Timestamp: {:?}", timestamp);
        return false;
    };

    if now_secs.saturating_sub(ts) > MAX_REQUEST_AGE_SECS
        || ts > now_secs.saturating_add(MAX_CLOCK_SKEW_SECS)
    {
        error!("Timestamp out of range, potential replay attack");
        return false;
    }

    let Some(computed_signature) = compute_signature(timestamp, request_body, signing_secret)
    else {
        return false;
    };

    if computed_signature
        .as_bytes()
        .ct_eq(signature.as_bytes())
        .into()
    {
        true
    } else {
        error!("Signature verification failed");
        false
    }
}

/// `v0=` + hex HMAC-SHA256 of `v0:{timestamp}:{body}`.
pub fn compute_signature(
    timestamp: &str,
    request_body: &[u8],
    signing_secret: &str,
) -> Option<String> {
    let mut mac = match HmacSha256::new_from_slice(signing_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return None;
        }
    };
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(request_body);
    Some(format!("v0={}", hex::encode(mac.finalize().into_bytes())))
}

/// Check the Slack signing headers of an inbound request.
pub fn verify_request(headers: &HeaderMap, request_body: &[u8], signing_secret: &str) -> bool {
    let Some(signature) = get_header_value(headers, SIGNATURE_HEADER) else {
        error!("Missing X-Slack-Signature header");
        return false;
    };

    let Some(timestamp) = get_header_value(headers, TIMESTAMP_HEADER) else {
        error!("Missing X-Slack-Request-Timestamp header");
        return false;
    };

    verify_slack_signature(request_body, timestamp, signature, signing_secret)
}
