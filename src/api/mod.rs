//! HTTP surface: Slack webhooks, the slash command and health checks

pub mod event_handler;
pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod signature;
pub mod slash_handler;
pub mod state;

pub use handler::{build_router, serve};
pub use state::AppState;
