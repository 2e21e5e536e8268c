//! LucidLayer - a Slack bot that relays messages and documents to watsonx.ai.
//!
//! Users get sassy replies to direct messages, humorous inline annotations on
//! files they share, and tone rewrites through the `/lucidlayer` slash command.
//!
//! # Architecture
//!
//! The system uses:
//! - axum for the webhook, slash-command and health routes
//! - a supervised pool of tokio tasks for every model call
//! - a bounded moka cache to drop redelivered Slack events
//! - slack-morphism and reqwest for Slack API interactions
//! - reqwest for the watsonx.ai REST API
//!
//! # Example
//!
//! ```no_run
//! use lucidlayer::api::{AppState, serve};
//! use lucidlayer::core::config::AppConfig;
//! use lucidlayer::worker::spawn_failure_logger;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     lucidlayer::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let (state, failures) = AppState::from_config(config);
//!     spawn_failure_logger(failures);
//!
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod extract;
pub mod slack;
pub mod worker;

/// Configure structured JSON logging.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
///
/// # Example
///
/// ```
/// lucidlayer::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
