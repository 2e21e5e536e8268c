//! Shared fakes and helpers for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};
use serde_json::Value;

use lucidlayer::ai::{ChatMessage, ModelClient, ModelProfiles};
use lucidlayer::api::AppState;
use lucidlayer::api::signature::compute_signature;
use lucidlayer::core::config::AppConfig;
use lucidlayer::core::models::{DocumentKind, FileMetadata};
use lucidlayer::errors::BotError;
use lucidlayer::extract::TextExtractor;
use lucidlayer::slack::ChatPlatform;
use lucidlayer::worker::{CallbackSink, EventProcessor, RewriteWorker, TaskFailure, TaskSupervisor};

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const BOT_USER_ID: &str = "UBOT";

pub fn test_config() -> AppConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SLACK_SIGNING_SECRET", SIGNING_SECRET),
        ("SLACK_BOT_TOKEN", "xoxb-test"),
        ("WATSONX_URL", "http://127.0.0.1:9"),
        ("WATSONX_APIKEY", "test-key"),
        ("PROJECT_ID", "proj-1"),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap()
}

/// Headers carrying a valid Slack signature for `body` at the current time.
pub fn signed_headers(body: &[u8]) -> HeaderMap {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        .to_string();
    let signature = compute_signature(&timestamp, body, SIGNING_SECRET).unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-slack-request-timestamp",
        HeaderValue::from_str(&timestamp).unwrap(),
    );
    headers.insert("x-slack-signature", HeaderValue::from_str(&signature).unwrap());
    headers
}

// ============================================================================
// Model fake
// ============================================================================

pub struct FakeModel {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelClient for FakeModel {
    async fn generate(&self, prompt: &str) -> Result<String, BotError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(BotError::ModelError)
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, BotError> {
        let joined = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.generate(&joined).await
    }
}

// ============================================================================
// Chat platform fake
// ============================================================================

pub struct FakeChat {
    pub file: Option<FileMetadata>,
    pub download: Option<Vec<u8>>,
    pub dms: Mutex<Vec<(String, String)>>,
    pub downloads: Mutex<Vec<String>>,
}

impl FakeChat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            file: None,
            download: None,
            dms: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        })
    }

    /// A chat whose `files.info` returns `file` and whose download yields
    /// `content`, or fails when `content` is `None`.
    pub fn with_file(file: FileMetadata, content: Option<&[u8]>) -> Arc<Self> {
        Arc::new(Self {
            file: Some(file),
            download: content.map(<[u8]>::to_vec),
            dms: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.dms.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatPlatform for FakeChat {
    async fn bot_user_id(&self) -> Result<String, BotError> {
        Ok(BOT_USER_ID.to_string())
    }

    async fn send_dm(&self, user_id: &str, text: &str) -> Result<(), BotError> {
        self.dms
            .lock()
            .unwrap()
            .push((user_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn file_info(&self, file_id: &str) -> Result<FileMetadata, BotError> {
        self.file
            .clone()
            .ok_or_else(|| BotError::ApiError(format!("file_not_found: {file_id}")))
    }

    async fn download_file(&self, url: &str) -> Result<Vec<u8>, BotError> {
        self.downloads.lock().unwrap().push(url.to_string());
        self.download
            .clone()
            .ok_or_else(|| BotError::HttpError("404 Not Found".to_string()))
    }
}

pub fn file_metadata(name: &str, file_type: &str) -> FileMetadata {
    FileMetadata {
        download_url: format!("https://files.slack.com/files-pri/T1-F1/{name}"),
        file_type: file_type.to_string(),
        file_name: name.to_string(),
        owner_id: Some("U123".to_string()),
    }
}

// ============================================================================
// Extractor and callback fakes
// ============================================================================

pub struct FakeExtractor {
    pub text: String,
}

impl TextExtractor for FakeExtractor {
    fn extract(&self, _bytes: &[u8], kind: DocumentKind) -> Result<String, BotError> {
        Ok(format!("{} from {}", self.text, kind.label()))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub posts: Mutex<Vec<(String, Value)>>,
}

impl RecordingSink {
    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallbackSink for RecordingSink {
    async fn post(&self, response_url: &str, payload: &Value) -> Result<(), BotError> {
        self.posts
            .lock()
            .unwrap()
            .push((response_url.to_string(), payload.clone()));
        Ok(())
    }
}

// ============================================================================
// Assembled state
// ============================================================================

pub struct Harness {
    pub state: AppState,
    pub failures: tokio::sync::mpsc::UnboundedReceiver<TaskFailure>,
    pub model: Arc<FakeModel>,
    pub chat: Arc<FakeChat>,
    pub sink: Arc<RecordingSink>,
}

pub fn harness(model: Arc<FakeModel>, chat: Arc<FakeChat>) -> Harness {
    let sink = Arc::new(RecordingSink::default());
    let (supervisor, failures) = TaskSupervisor::new();

    let processor = EventProcessor::new(
        chat.clone(),
        ModelProfiles::new(model.clone(), model.clone()),
        Arc::new(FakeExtractor {
            text: "extracted".to_string(),
        }),
        3000,
    );
    let rewriter = RewriteWorker::new(model.clone(), sink.clone());

    Harness {
        state: AppState::new(test_config(), supervisor, processor, rewriter),
        failures,
        model,
        chat,
        sink,
    }
}
