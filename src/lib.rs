pub mod config;
pub mod domain;
pub mod embed;
pub mod error;
pub mod notifier;
pub mod opensea;
pub mod utils;
pub mod watcher;
pub mod window;

use config::AppConfig;
use domain::WATCHED_CONTRACTS;
use notifier::{DiscordNotifier, NotifierHub};
use opensea::OpenSeaClient;
use watcher::SalesWatcher;

use anyhow::Result;
use tracing::{info, warn};

pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;

    if config.discord_bot_token.is_none() {
        warn!("⚠️  DISCORD_BOT_TOKEN not set - any sale found will fail to send");
    }
    if config.discord_channel_ids.is_empty() {
        warn!("⚠️  DISCORD_CHANNEL_ID not set - any sale found will fail to send");
    }
    info!("⏱️  Looking back {} seconds", config.lookback_seconds);

    let opensea = OpenSeaClient::new(config.opensea_api_url.clone(), config.opensea_token.clone());
    let discord = DiscordNotifier::from_config(&config);
    let notifier = NotifierHub::new(discord, config.discord_channel_ids.clone());

    let app = SalesWatcher::new(
        WATCHED_CONTRACTS.to_vec(),
        opensea,
        notifier,
        config.lookback_seconds,
    );
    let delivered = app.run().await?;
    info!("🏁 Done, {} messages delivered", delivered);
    Ok(())
}
