use std::env;

use anyhow::{anyhow, Result};

pub const DEFAULT_LOOKBACK_SECONDS: u64 = 3_600;
pub const DEFAULT_OPENSEA_API_URL: &str = "https://api.opensea.io/api/v1";
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord_bot_token: Option<String>,
    pub discord_channel_ids: Vec<String>,
    pub opensea_token: Option<String>,
    pub lookback_seconds: u64,
    pub opensea_api_url: String,
    pub discord_api_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let discord_bot_token = non_empty_var("DISCORD_BOT_TOKEN");
        let discord_channel_ids =
            parse_channel_ids(&env::var("DISCORD_CHANNEL_ID").unwrap_or_default());
        let opensea_token = non_empty_var("OPENSEA_TOKEN");

        let lookback_seconds = match non_empty_var("SECONDS") {
            Some(raw) => parse_lookback(&raw)?,
            None => DEFAULT_LOOKBACK_SECONDS,
        };

        let opensea_api_url = non_empty_var("OPENSEA_API_URL")
            .unwrap_or_else(|| DEFAULT_OPENSEA_API_URL.to_string());
        let discord_api_url = non_empty_var("DISCORD_API_URL")
            .unwrap_or_else(|| DEFAULT_DISCORD_API_URL.to_string());

        Ok(Self {
            discord_bot_token,
            discord_channel_ids,
            opensea_token,
            lookback_seconds,
            opensea_api_url: opensea_api_url.trim_end_matches('/').to_string(),
            discord_api_url: discord_api_url.trim_end_matches('/').to_string(),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn parse_channel_ids(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn parse_lookback(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow!("SECONDS must be a non-negative integer, got {raw:?}"))
}
