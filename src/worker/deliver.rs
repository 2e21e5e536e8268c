use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{error, info};

use crate::errors::BotError;

/// Destination for slash-command follow-ups (`response_url`).
#[async_trait]
pub trait CallbackSink: Send + Sync {
    async fn post(&self, response_url: &str, payload: &Value) -> Result<(), BotError>;
}

/// Posts callback payloads over HTTP.
#[derive(Clone, Default)]
pub struct HttpCallbackSink {
    http_client: HttpClient,
}

impl HttpCallbackSink {
    #[must_use]
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl CallbackSink for HttpCallbackSink {
    async fn post(&self, response_url: &str, payload: &Value) -> Result<(), BotError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http_client
            .post(response_url)
            .headers(headers)
            .json(payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            error!(
                "response_url POST failed: status={} body={}",
                status, body_text
            );
            return Err(BotError::HttpError(format!(
                "response_url POST returned {status}"
            )));
        }

        info!("Delivered response_url payload");
        Ok(())
    }
}

/// Cut `text` to at most `max_chars` characters, never splitting a character.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[tokio::test]
    async fn test_http_sink_posts_payload() {
        let server = MockServer::start().await;
        let payload = json!({"response_type": "ephemeral", "text": "done"});

        Mock::given(method("POST"))
            .and(path("/commands/T1/123"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = HttpCallbackSink::default();
        sink.post(&format!("{}/commands/T1/123", server.uri()), &payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_http_sink_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("expired_url"))
            .mount(&server)
            .await;

        let result = HttpCallbackSink::default()
            .post(&server.uri(), &json!({"text": "late"}))
            .await;
        assert!(matches!(result, Err(BotError::HttpError(_))));
    }
}
