use ai_llm_service::telemetry;
use anyhow::Context;
use tracing::{Level, info};
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` is optional; real deployments pass variables directly.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to read .env");
        }
    }

    let filter = telemetry::env_filter_with_level("info", Level::DEBUG);

    // The LLM crate renders its own events (with span timings) via its layer.
    let app_layer = fmt::layer()
        .with_target(true)
        .with_filter(filter::filter_fn(|meta| !telemetry::is_own_target(meta.target())));

    tracing_subscriber::registry()
        .with(filter)
        .with(app_layer)
        .with(telemetry::layer())
        .try_init()
        .context("failed to install tracing subscriber")?;

    let config = api::AppConfig::from_env().context("invalid configuration")?;
    info!(address = %config.address, app_id = config.app_id, "starting pr-review-bot");

    api::start(config).await.context("server failed")?;
    Ok(())
}
