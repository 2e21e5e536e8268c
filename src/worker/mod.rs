//! Background work: supervised tasks, event processing and command rewrites

pub mod deliver;
pub mod processor;
pub mod rewrite;
pub mod supervisor;

pub use deliver::{CallbackSink, HttpCallbackSink};
pub use processor::EventProcessor;
pub use rewrite::RewriteWorker;
pub use supervisor::{TaskFailure, TaskSupervisor, spawn_failure_logger};
