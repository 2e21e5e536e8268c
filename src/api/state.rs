use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::ai::ModelProfiles;
use crate::core::config::AppConfig;
use crate::core::registry::ProcessedEventRegistry;
use crate::extract::DocumentExtractor;
use crate::slack::SlackClient;
use crate::worker::{EventProcessor, HttpCallbackSink, RewriteWorker, TaskFailure, TaskSupervisor};

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: ProcessedEventRegistry,
    pub supervisor: TaskSupervisor,
    pub processor: Arc<EventProcessor>,
    pub rewriter: Arc<RewriteWorker>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: AppConfig,
        supervisor: TaskSupervisor,
        processor: EventProcessor,
        rewriter: RewriteWorker,
    ) -> Self {
        let registry = ProcessedEventRegistry::new(
            config.dedup_max_entries,
            Duration::from_secs(config.dedup_ttl_secs),
        );

        Self {
            config: Arc::new(config),
            registry,
            supervisor,
            processor: Arc::new(processor),
            rewriter: Arc::new(rewriter),
        }
    }

    /// Wire the production collaborators: Slack, watsonx and HTTP callbacks.
    #[must_use]
    pub fn from_config(config: AppConfig) -> (Self, UnboundedReceiver<TaskFailure>) {
        let (supervisor, failures) = TaskSupervisor::new();
        let models = ModelProfiles::watsonx(&config);
        let slack = Arc::new(SlackClient::new(config.slack_bot_token.clone()));

        let processor = EventProcessor::new(
            slack,
            models.clone(),
            Arc::new(DocumentExtractor),
            config.dm_max_chars,
        );
        let rewriter = RewriteWorker::new(
            models.general_client(),
            Arc::new(HttpCallbackSink::default()),
        );

        (Self::new(config, supervisor, processor, rewriter), failures)
    }
}
