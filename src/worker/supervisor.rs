//! Supervised submission of background tasks.
//!
//! Every unit of model-API work is handed to [`TaskSupervisor::submit`], which
//! spawns it on the tokio runtime and reports errors and panics on a failure
//! channel instead of letting them disappear with a detached task.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::errors::BotError;

/// A background task that ended with an error or a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: &'static str,
    pub correlation_id: String,
    pub error: String,
}

#[derive(Default)]
struct Counters {
    scheduled: AtomicUsize,
    in_flight: AtomicUsize,
    idle: Notify,
}

#[derive(Clone)]
pub struct TaskSupervisor {
    counters: Arc<Counters>,
    failures: UnboundedSender<TaskFailure>,
}

impl TaskSupervisor {
    /// Create a supervisor and the receiving end of its failure channel.
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<TaskFailure>) {
        let (failures, rx) = mpsc::unbounded_channel();
        (
            Self {
                counters: Arc::new(Counters::default()),
                failures,
            },
            rx,
        )
    }

    /// Spawn `work` in the background. Never blocks the caller.
    pub fn submit<F>(&self, task: &'static str, correlation_id: impl Into<String>, work: F)
    where
        F: Future<Output = Result<(), BotError>> + Send + 'static,
    {
        let correlation_id = correlation_id.into();
        self.counters.scheduled.fetch_add(1, Ordering::SeqCst);
        self.counters.in_flight.fetch_add(1, Ordering::SeqCst);
        debug!(task, correlation_id = %correlation_id, "Scheduling background task");

        let counters = Arc::clone(&self.counters);
        let failures = self.failures.clone();

        tokio::spawn(async move {
            let outcome = match tokio::spawn(work).await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(join_err) if join_err.is_panic() => Some("task panicked".to_string()),
                Err(join_err) => Some(join_err.to_string()),
            };

            if let Some(error) = outcome {
                // Receiver gone means we are shutting down; the task is over either way.
                let _ = failures.send(TaskFailure {
                    task,
                    correlation_id,
                    error,
                });
            }

            if counters.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                counters.idle.notify_waiters();
            }
        });
    }

    /// Total number of tasks ever submitted.
    #[must_use]
    pub fn scheduled(&self) -> usize {
        self.counters.scheduled.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Resolve once no submitted task is still running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.counters.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Drain the failure channel into the log until every sender is dropped.
pub fn spawn_failure_logger(mut failures: UnboundedReceiver<TaskFailure>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(failure) = failures.recv().await {
            error!(
                task = failure.task,
                correlation_id = %failure.correlation_id,
                "Background task failed: {}",
                failure.error
            );
        }
    })
}
