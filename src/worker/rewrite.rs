use std::sync::Arc;

use tracing::{info, warn};

use super::deliver::CallbackSink;
use crate::ai::ModelClient;
use crate::ai::prompt::build_rewrite_prompt;
use crate::core::models::RewriteRequest;
use crate::errors::BotError;
use crate::slack::response_builder::{create_rewrite_error_payload, create_rewrite_payload};

/// Background half of the `/lucidlayer` command.
#[derive(Clone)]
pub struct RewriteWorker {
    model: Arc<dyn ModelClient>,
    callbacks: Arc<dyn CallbackSink>,
}

impl RewriteWorker {
    #[must_use]
    pub fn new(model: Arc<dyn ModelClient>, callbacks: Arc<dyn CallbackSink>) -> Self {
        Self { model, callbacks }
    }

    /// Generate the rewrite and post exactly one payload to `response_url`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the callback POST itself fails; model
    /// failures are delivered to the caller as an error payload.
    pub async fn run(&self, request: RewriteRequest) -> Result<(), BotError> {
        let prompt = build_rewrite_prompt(&request.message, request.mode);

        let payload = match self.model.generate(&prompt).await {
            Ok(rewritten) => {
                info!(
                    correlation_id = %request.correlation_id,
                    mode = %request.mode,
                    "Rewrite generated"
                );
                create_rewrite_payload(&request.user_id, request.mode, &rewritten)
            }
            Err(e) => {
                warn!(correlation_id = %request.correlation_id, "Rewrite failed: {}", e);
                create_rewrite_error_payload(&e.to_string())
            }
        };

        self.callbacks.post(&request.response_url, &payload).await
    }
}
