//! Background handling of accepted Slack events.

use std::sync::Arc;

use tracing::{info, warn};

use super::deliver::truncate_chars;
use crate::ai::ModelProfiles;
use crate::ai::prompt::{build_annotation_prompt, build_conversation_prompt};
use crate::core::models::{AnnotationJob, EventKind, InboundEvent, SharedContent};
use crate::errors::BotError;
use crate::extract::{TextExtractor, extract_or_describe};
use crate::slack::ChatPlatform;

pub const DOWNLOAD_FAILED_MESSAGE: &str = "Couldn't download the file, please retry.";
pub const UNDECODABLE_PLACEHOLDER: &str = "[Unable to decode file content]";

/// Runs one accepted event to completion: DM replies and file annotations.
#[derive(Clone)]
pub struct EventProcessor {
    chat: Arc<dyn ChatPlatform>,
    models: ModelProfiles,
    extractor: Arc<dyn TextExtractor>,
    dm_max_chars: usize,
}

impl EventProcessor {
    #[must_use]
    pub fn new(
        chat: Arc<dyn ChatPlatform>,
        models: ModelProfiles,
        extractor: Arc<dyn TextExtractor>,
        dm_max_chars: usize,
    ) -> Self {
        Self {
            chat,
            models,
            extractor,
            dm_max_chars,
        }
    }

    /// Process a single event. Unsupported events are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error when a failure could not be reported to the user,
    /// e.g. the DM itself could not be sent or file metadata was unavailable.
    pub async fn process(&self, event: InboundEvent) -> Result<(), BotError> {
        match event.kind {
            EventKind::DirectMessage => self.reply_to_direct_message(&event).await,
            EventKind::FileShared => self.annotate_shared_file(&event).await,
            EventKind::Other(ref event_type) => {
                info!(event_id = %event.event_id, "Ignoring event type {:?}", event_type);
                Ok(())
            }
        }
    }

    async fn reply_to_direct_message(&self, event: &InboundEvent) -> Result<(), BotError> {
        if event.subtype.is_some() || event.bot_id.is_some() {
            info!(event_id = %event.event_id, "Ignoring DM subtype or bot message");
            return Ok(());
        }
        let Some(sender) = event.sender_id.as_deref() else {
            return Ok(());
        };

        let bot_user_id = self.chat.bot_user_id().await?;
        if sender == bot_user_id {
            return Ok(());
        }

        let user_message = event.text.trim();
        if user_message.is_empty() {
            return Ok(());
        }

        let prompt = build_conversation_prompt(user_message);
        let reply = match self.models.general().generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(event_id = %event.event_id, "DM reply generation failed: {}", e);
                format!("Oops! I tried to sass you but got stage fright: {e}")
            }
        };

        self.chat.send_dm(sender, &reply).await
    }

    async fn annotate_shared_file(&self, event: &InboundEvent) -> Result<(), BotError> {
        let Some(file_id) = event.file_id.as_deref() else {
            info!(event_id = %event.event_id, "file_shared event without a file id");
            return Ok(());
        };

        let metadata = self.chat.file_info(file_id).await.inspect_err(|e| {
            warn!(event_id = %event.event_id, file_id, "files.info failed: {}", e);
        })?;

        let owner = metadata
            .owner_id
            .clone()
            .or_else(|| event.sender_id.clone())
            .ok_or_else(|| BotError::ParseError(format!("file {file_id} has no owner")))?;

        let content = match self.chat.download_file(&metadata.download_url).await {
            Ok(content) => content,
            Err(e) => {
                warn!(event_id = %event.event_id, file_id, "File download failed: {}", e);
                return self.chat.send_dm(&owner, DOWNLOAD_FAILED_MESSAGE).await;
            }
        };

        let job = AnnotationJob {
            file_name: metadata.file_name,
            file_type: metadata.file_type,
            content,
            user_id: owner,
        };
        self.run_annotation(job).await
    }

    async fn run_annotation(&self, job: AnnotationJob) -> Result<(), BotError> {
        let shared = SharedContent::classify(&job.file_type);
        info!(
            file_name = %job.file_name,
            user_id = %job.user_id,
            "Annotating {} bytes as {:?}",
            job.content.len(),
            shared
        );

        let text = match shared {
            SharedContent::Document(kind) => {
                let extractor = Arc::clone(&self.extractor);
                let bytes = job.content;
                tokio::task::spawn_blocking(move || {
                    extract_or_describe(extractor.as_ref(), &bytes, kind)
                })
                .await
                .map_err(|e| BotError::GeneralError(format!("extraction task failed: {e}")))?
            }
            SharedContent::RawText => String::from_utf8(job.content)
                .unwrap_or_else(|_| UNDECODABLE_PLACEHOLDER.to_string()),
        };

        let prompt = build_annotation_prompt(&text);
        let comment = self
            .models
            .for_profile(shared.profile())
            .generate(&prompt)
            .await
            .unwrap_or_else(|e| format!("Error generating comments: {e}"));

        let message = format!(
            "Here's your annotated `{}`:\n\n{}",
            job.file_name,
            truncate_chars(&comment, self.dm_max_chars)
        );
        self.chat.send_dm(&job.user_id, &message).await
    }
}
