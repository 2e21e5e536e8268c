//! watsonx.ai API client module
//!
//! Encapsulates text generation and chat calls against the watsonx.ai REST API,
//! including the IAM API-key exchange that produces the bearer token.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::models::ContentProfile;
use crate::errors::BotError;

const API_VERSION: &str = "2023-05-29";
const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens are refreshed this long before IAM says they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn of a chat-style conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A hosted model that turns prompts into text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a completion for a single prompt string.
    async fn generate(&self, prompt: &str) -> Result<String, BotError>;

    /// Continue a structured conversation and return the assistant reply.
    ///
    /// The bot's own flows use single prompts through [`ModelClient::generate`];
    /// this is the entry point for multi-turn callers.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, BotError>;
}

/// The two model configurations used by the bot.
#[derive(Clone)]
pub struct ModelProfiles {
    general: Arc<dyn ModelClient>,
    code: Arc<dyn ModelClient>,
}

impl ModelProfiles {
    #[must_use]
    pub fn new(general: Arc<dyn ModelClient>, code: Arc<dyn ModelClient>) -> Self {
        Self { general, code }
    }

    /// Build both profiles against watsonx, sharing one IAM token cache.
    #[must_use]
    pub fn watsonx(config: &AppConfig) -> Self {
        let http = Client::new();
        let tokens = Arc::new(IamTokenProvider::new(
            http.clone(),
            config.watsonx_iam_url.clone(),
            config.watsonx_api_key.clone(),
        ));
        let params = GenerationParams::greedy(config.max_new_tokens);

        let general = WatsonxClient::new(
            http.clone(),
            Arc::clone(&tokens),
            config.watsonx_url.clone(),
            config.project_id.clone(),
            config.general_model_id.clone(),
            params.clone(),
        );
        let code = WatsonxClient::new(
            http,
            tokens,
            config.watsonx_url.clone(),
            config.project_id.clone(),
            config.code_model_id.clone(),
            params,
        );

        Self::new(Arc::new(general), Arc::new(code))
    }

    #[must_use]
    pub fn general(&self) -> &dyn ModelClient {
        self.general.as_ref()
    }

    /// Shared handle to the general model, for workers that own their client.
    #[must_use]
    pub fn general_client(&self) -> Arc<dyn ModelClient> {
        Arc::clone(&self.general)
    }

    #[must_use]
    pub fn for_profile(&self, profile: ContentProfile) -> &dyn ModelClient {
        match profile {
            ContentProfile::General => self.general.as_ref(),
            ContentProfile::Code => self.code.as_ref(),
        }
    }
}

/// Fixed decoding configuration sent with every generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationParams {
    pub decoding_method: String,
    pub max_new_tokens: u32,
}

impl GenerationParams {
    #[must_use]
    pub fn greedy(max_new_tokens: u32) -> Self {
        Self {
            decoding_method: "greedy".to_string(),
            max_new_tokens,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// IAM token exchange
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Exchanges an IBM Cloud API key for short-lived bearer tokens and caches them.
pub struct IamTokenProvider {
    http: Client,
    iam_url: String,
    api_key: String,
    cached: Mutex<Option<CachedToken>>,
}

impl IamTokenProvider {
    #[must_use]
    pub fn new(http: Client, iam_url: String, api_key: String) -> Self {
        Self {
            http,
            iam_url,
            api_key,
            cached: Mutex::new(None),
        }
    }

    /// # Errors
    ///
    /// Returns `BotError::ModelError` if the IAM endpoint rejects the key or
    /// answers with an unexpected body.
    pub async fn bearer_token(&self) -> Result<String, BotError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN
        {
            return Ok(token.value.clone());
        }

        debug!("Requesting new IAM token");
        let resp = self
            .http
            .post(&self.iam_url)
            .form(&[("grant_type", IAM_GRANT_TYPE), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| BotError::ModelError(format!("IAM token request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotError::ModelError(format!(
                "IAM token request HTTP {}",
                resp.status()
            )));
        }

        let token: IamTokenResponse = resp
            .json()
            .await
            .map_err(|e| BotError::ModelError(format!("IAM token parse error: {e}")))?;

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// watsonx.ai client
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    results: Vec<GenerationResult>,
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// watsonx.ai client bound to one model id.
pub struct WatsonxClient {
    http: Client,
    tokens: Arc<IamTokenProvider>,
    base_url: String,
    project_id: String,
    model_id: String,
    params: GenerationParams,
}

impl WatsonxClient {
    #[must_use]
    pub fn new(
        http: Client,
        tokens: Arc<IamTokenProvider>,
        base_url: String,
        project_id: String,
        model_id: String,
        params: GenerationParams,
    ) -> Self {
        Self {
            http,
            tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
            model_id,
            params,
        }
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<reqwest::Response, BotError> {
        let token = self.tokens.bearer_token().await?;
        let url = format!("{}{endpoint}?version={API_VERSION}", self.base_url);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::ModelError(format!("Request to {endpoint} failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(BotError::ModelError(format!(
                "{endpoint} HTTP {status}: {body_text}"
            )));
        }

        Ok(resp)
    }
}

#[async_trait]
impl ModelClient for WatsonxClient {
    async fn generate(&self, prompt: &str) -> Result<String, BotError> {
        #[cfg(feature = "debug-logs")]
        info!(model_id = %self.model_id, "Using prompt:\n{}", prompt);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            model_id = %self.model_id,
            prompt_chars = prompt.chars().count(),
            "Generating text"
        );

        let body = json!({
            "model_id": self.model_id,
            "input": prompt,
            "parameters": self.params,
            "project_id": self.project_id,
        });

        let parsed: GenerationResponse = self
            .post_json("/ml/v1/text/generation", &body)
            .await?
            .json()
            .await
            .map_err(|e| BotError::ModelError(format!("Invalid generation response: {e}")))?;

        parsed
            .results
            .into_iter()
            .next()
            .map(|r| r.generated_text.trim().to_string())
            .ok_or_else(|| BotError::ModelError("No results in generation response".to_string()))
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, BotError> {
        info!(
            model_id = %self.model_id,
            turns = messages.len(),
            "Running chat completion"
        );

        let body = json!({
            "model_id": self.model_id,
            "project_id": self.project_id,
            "messages": messages,
            "max_tokens": self.params.max_new_tokens,
            "temperature": 0,
        });

        let parsed: ChatResponse = self
            .post_json("/ml/v1/text/chat", &body)
            .await?
            .json()
            .await
            .map_err(|e| BotError::ModelError(format!("Invalid chat response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| BotError::ModelError("No choices in chat response".to_string()))
    }
}
