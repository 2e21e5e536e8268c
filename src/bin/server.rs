use anyhow::Context;
use lucidlayer::api::{AppState, serve};
use lucidlayer::core::config::AppConfig;
use lucidlayer::worker::spawn_failure_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lucidlayer::setup_logging();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let (state, failures) = AppState::from_config(config);
    let failure_logger = spawn_failure_logger(failures);

    serve(state).await.context("Server terminated with an error")?;

    // All supervisor handles are gone after `serve`, so the logger drains and stops.
    let _ = failure_logger.await;
    Ok(())
}
