use anyhow::{Context, Result};
use chrono::Utc;
use market_digest::{
    LogNotifier, LunarCrushProvider, Notifier, PriceTracker, TelegramNotifier, TrackerConfig,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = TrackerConfig::from_env().context("loading configuration")?;

    let provider = Arc::new(
        LunarCrushProvider::with_base_url(config.base_url.clone(), config.api_key.clone())
            .context("building LunarCrush client")?,
    );

    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(telegram) => Arc::new(
            TelegramNotifier::new(&telegram.bot_token, telegram.chat_id.clone())
                .context("building Telegram client")?,
        ),
        None => {
            info!("TELEGRAM_BOT_TOKEN not set, digests go to the log");
            Arc::new(LogNotifier)
        }
    };

    info!(
        tracked = ?config.tracked_assets,
        universe = config.universe.len(),
        snapshot = %config.snapshot_path.display(),
        "market-digest up"
    );

    let mut tracker = PriceTracker::new(config, provider, notifier);
    tracker
        .start(Utc::now())
        .context("preparing snapshot store")?;

    tracker
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await;

    Ok(())
}
