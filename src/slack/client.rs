//! Slack API client module
//!
//! Encapsulates all Slack API interactions with retry logic and error handling.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use slack_morphism::errors::SlackClientError;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::{SlackApiChatPostMessageRequest, SlackApiConversationsOpenRequest};
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent, SlackUserId,
};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio_retry::strategy::jitter;
use tokio_retry::{Retry, RetryIf, strategy::ExponentialBackoff};
use tracing::{debug, info, warn};

use super::ChatPlatform;
use crate::core::models::FileMetadata;
use crate::errors::BotError;

pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Total tries for a Slack Web API call, the first one included.
pub const MAX_ATTEMPTS: usize = 5;

/// Delays between attempts: one fewer than [`MAX_ATTEMPTS`].
fn retry_delays() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(100)
        .map(jitter)
        .take(MAX_ATTEMPTS - 1)
}

// Build the Slack client connector safely without panicking.
// If connector construction fails, store None and surface a BotError at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[derive(Debug, Deserialize)]
struct FilesInfoResponse {
    ok: bool,
    file: Option<FileObject>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    url_private_download: Option<String>,
    url_private: Option<String>,
    #[serde(default)]
    filetype: String,
    #[serde(default)]
    name: String,
    user: Option<String>,
}

/// Slack API client with retry logic and error handling
pub struct SlackClient {
    token: SlackApiToken,
    api_base: String,
    bot_user_id: OnceCell<String>,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
            api_base: SLACK_API_BASE.to_string(),
            bot_user_id: OnceCell::new(),
        }
    }

    /// Point the raw Web API calls (`files.info`) at another base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn token(&self) -> &SlackApiToken {
        &self.token
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, BotError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, BotError>> + Send,
        T: Send,
    {
        Retry::spawn(retry_delays(), operation).await
    }

    fn connector() -> Result<&'static SlackHyperClient, BotError> {
        SLACK_CLIENT.as_ref().ok_or_else(|| {
            BotError::GeneralError("Slack HTTP connector not initialized".to_string())
        })
    }

    /// # Errors
    ///
    /// Returns an error if the Slack API call fails or response parsing fails.
    pub async fn get_user_im_channel(&self, user_id: &str) -> Result<String, BotError> {
        self.with_retry(|| async {
            let session = Self::connector()?.open_session(&self.token);
            let open_req = SlackApiConversationsOpenRequest::new()
                .with_users(vec![SlackUserId(user_id.to_string())]);

            let result = session.conversations_open(&open_req).await?;
            Ok(result.channel.id.0)
        })
        .await
    }

    /// Resolve the bot's own user id via `auth.test`, cached after the first success.
    ///
    /// # Errors
    ///
    /// Returns an error if `auth.test` keeps failing after retries.
    pub async fn get_bot_user_id(&self) -> Result<String, BotError> {
        let id = self
            .bot_user_id
            .get_or_try_init(|| async {
                self.with_retry(|| async {
                    let session = Self::connector()?.open_session(&self.token);
                    let test_resp = session.auth_test().await?;
                    Ok(test_resp.user_id.0)
                })
                .await
            })
            .await?;

        Ok(id.clone())
    }

    /// # Errors
    ///
    /// Returns an error if opening the IM channel or posting the message fails.
    pub async fn send_dm(&self, user_id: &str, message: &str) -> Result<(), BotError> {
        if message.trim().is_empty() {
            debug!("Skipping empty DM to {}", user_id);
            return Ok(());
        }

        let im_channel = self.get_user_im_channel(user_id).await?;

        let connector = Self::connector()?;
        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(im_channel),
            SlackMessageContent::new().with_text(message.to_string()),
        );

        // A failed post may still have been delivered, so only rate-limited posts are repeated.
        RetryIf::spawn(
            retry_delays(),
            || async {
                let session = connector.open_session(&self.token);
                session.chat_post_message(&post_req).await.map(|_| ())
            },
            |e: &SlackClientError| matches!(e, SlackClientError::RateLimitError(_)),
        )
        .await
        .map_err(BotError::from)
    }

    /// Fetch metadata for a shared file via `files.info`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, Slack answers `ok: false`,
    /// or the file has no private download URL.
    pub async fn get_file_info(&self, file_id: &str) -> Result<FileMetadata, BotError> {
        let resp = HTTP_CLIENT
            .get(format!("{}/files.info", self.api_base))
            .bearer_auth(&self.token.token_value.0)
            .query(&[("file", file_id)])
            .send()
            .await
            .map_err(|e| BotError::HttpError(format!("Failed to call files.info: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotError::ApiError(format!(
                "files.info HTTP {}",
                resp.status()
            )));
        }

        let body: FilesInfoResponse = resp
            .json()
            .await
            .map_err(|e| BotError::ParseError(format!("files.info JSON parse error: {e}")))?;

        if !body.ok {
            return Err(BotError::ApiError(format!(
                "files.info error: {}",
                body.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        let file = body
            .file
            .ok_or_else(|| BotError::ApiError("files.info returned no file".to_string()))?;

        let download_url = file
            .url_private_download
            .or(file.url_private)
            .ok_or_else(|| {
                BotError::ApiError(format!("File {file_id} has no private download URL"))
            })?;

        Ok(FileMetadata {
            download_url,
            file_type: file.filetype,
            file_name: file.name,
            owner_id: file.user,
        })
    }

    /// Download a private Slack file with bot auth.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Slack responds non-2xx, or the
    /// body is empty.
    pub async fn download_file(&self, url: &str) -> Result<Vec<u8>, BotError> {
        let resp = HTTP_CLIENT
            .get(url)
            .bearer_auth(&self.token.token_value.0)
            .send()
            .await
            .map_err(|e| BotError::HttpError(format!("Failed to download Slack file: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotError::ApiError(format!(
                "Slack file download HTTP {}",
                resp.status()
            )));
        }

        let bytes = resp.bytes().await.map_err(|e| {
            BotError::HttpError(format!("Error reading Slack file download: {e}"))
        })?;

        if bytes.is_empty() {
            return Err(BotError::ApiError("Slack file download was empty".to_string()));
        }

        info!("Downloaded {} bytes from Slack", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn bot_user_id(&self) -> Result<String, BotError> {
        self.get_bot_user_id().await
    }

    async fn send_dm(&self, user_id: &str, text: &str) -> Result<(), BotError> {
        SlackClient::send_dm(self, user_id, text).await
    }

    async fn file_info(&self, file_id: &str) -> Result<FileMetadata, BotError> {
        self.get_file_info(file_id).await
    }

    async fn download_file(&self, url: &str) -> Result<Vec<u8>, BotError> {
        SlackClient::download_file(self, url).await
    }
}
