//! All Slack-specific functionality

pub mod client;
pub mod command_parser;
pub mod response_builder;

use async_trait::async_trait;

use crate::core::models::FileMetadata;
use crate::errors::BotError;

// Re-export main types for convenience
pub use client::SlackClient;

/// The chat-platform operations the background workers depend on.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// The bot's own user id, used to ignore its own messages.
    async fn bot_user_id(&self) -> Result<String, BotError>;

    async fn send_dm(&self, user_id: &str, text: &str) -> Result<(), BotError>;

    async fn file_info(&self, file_id: &str) -> Result<FileMetadata, BotError>;

    /// Authenticated GET of a private file URL.
    async fn download_file(&self, url: &str) -> Result<Vec<u8>, BotError>;
}
