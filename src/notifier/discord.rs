use crate::config::AppConfig;
use crate::embed::Embed;
use crate::error::SalesError;
use crate::notifier::Notifier;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Channel types that accept messages: guild text, DM, group DM,
/// announcement and the three thread kinds.
const TEXT_CHANNEL_TYPES: &[u8] = &[0, 1, 3, 5, 10, 11, 12];

#[derive(Debug, Deserialize)]
struct BotUser {
    id: String,
    username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextChannel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

/// An authenticated connection to the Discord REST API.
#[derive(Debug, Clone)]
pub struct DiscordSession {
    client: reqwest::Client,
    base_url: String,
    authorization: String,
}

impl DiscordSession {
    /// Authenticates `token` and returns once the bot identity is confirmed.
    pub async fn connect(
        client: reqwest::Client,
        base_url: &str,
        token: Option<&str>,
    ) -> Result<Self, SalesError> {
        let token = token.ok_or(SalesError::MissingConfig("DISCORD_BOT_TOKEN"))?;
        let authorization = format!("Bot {token}");

        let response = client
            .get(format!("{base_url}/users/@me"))
            .header("Authorization", &authorization)
            .send()
            .await?;
        let response = check_status(response, "login").await?;
        let user: BotUser = response.json().await?;

        info!("🤖 Logged in to Discord as {} ({})", user.username, user.id);

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            authorization,
        })
    }

    pub async fn resolve_channel(&self, channel_id: &str) -> Result<TextChannel, SalesError> {
        let response = self
            .client
            .get(format!("{}/channels/{channel_id}", self.base_url))
            .header("Authorization", &self.authorization)
            .send()
            .await?;
        let response = check_status(response, "channel lookup").await?;
        let channel: TextChannel = response.json().await?;

        if !TEXT_CHANNEL_TYPES.contains(&channel.kind) {
            return Err(SalesError::ChannelNotSendable {
                id: channel.id,
                kind: channel.kind,
            });
        }

        Ok(channel)
    }

    pub async fn send(&self, channel: &TextChannel, embed: &Embed) -> Result<(), SalesError> {
        let payload = serde_json::json!({ "embeds": [embed] });

        let response = self
            .client
            .post(format!("{}/channels/{}/messages", self.base_url, channel.id))
            .header("Authorization", &self.authorization)
            .json(&payload)
            .send()
            .await?;
        check_status(response, "message send").await?;

        Ok(())
    }
}

async fn check_status(
    response: reqwest::Response,
    action: &'static str,
) -> Result<reqwest::Response, SalesError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(SalesError::Discord {
        action,
        status: status.as_u16(),
        body,
    })
}

/// Posts embeds to Discord, connecting on first use.
pub struct DiscordNotifier {
    client: reqwest::Client,
    base_url: String,
    bot_token: Option<String>,
    session: OnceCell<DiscordSession>,
}

impl DiscordNotifier {
    pub fn new(base_url: impl Into<String>, bot_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            bot_token,
            session: OnceCell::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.discord_api_url.clone(), config.discord_bot_token.clone())
    }

    async fn session(&self) -> Result<&DiscordSession, SalesError> {
        self.session
            .get_or_try_init(|| {
                DiscordSession::connect(
                    self.client.clone(),
                    &self.base_url,
                    self.bot_token.as_deref(),
                )
            })
            .await
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, channel_id: &str, embed: &Embed) -> Result<(), SalesError> {
        let session = self.session().await?;
        let channel = session.resolve_channel(channel_id).await?;
        debug!(channel = %channel.id, kind = channel.kind, "Resolved Discord channel");

        session.send(&channel, embed).await?;
        info!("📨 Sent \"{}\" to channel {}", embed.title, channel.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SaleEvent;
    use crate::embed::build_notification;
    use mockito::{Matcher, Server};

    async fn mock_login(server: &mut Server, hits: usize) -> mockito::Mock {
        server
            .mock("GET", "/users/@me")
            .match_header("authorization", "Bot test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "1001", "username": "sales-bot"}"#)
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn connect_requires_token() {
        let err = DiscordSession::connect(reqwest::Client::new(), "http://127.0.0.1:1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SalesError::MissingConfig("DISCORD_BOT_TOKEN")));
    }

    #[tokio::test]
    async fn connect_rejects_bad_token() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/@me")
            .with_status(401)
            .with_body(r#"{"message": "401: Unauthorized", "code": 0}"#)
            .create_async()
            .await;

        let err = DiscordSession::connect(reqwest::Client::new(), &server.url(), Some("bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, SalesError::Discord { action: "login", status: 401, .. }));
    }

    #[tokio::test]
    async fn notifier_connects_once_and_posts_embed() {
        let mut server = Server::new_async().await;
        let login = mock_login(&mut server, 1).await;
        let lookup = server
            .mock("GET", "/channels/555")
            .with_status(200)
            .with_body(r#"{"id": "555", "type": 0, "name": "sales"}"#)
            .expect(2)
            .create_async()
            .await;
        let post = server
            .mock("POST", "/channels/555/messages")
            .match_header("authorization", "Bot test-token")
            .match_body(Matcher::Regex(r#""title":"Unnamed NFT sold!""#.to_string()))
            .with_status(200)
            .with_body(r#"{"id": "9"}"#)
            .expect(2)
            .create_async()
            .await;

        let notifier = DiscordNotifier::new(server.url(), Some("test-token".to_string()));
        let embed = build_notification(&SaleEvent::default());
        notifier.send("555", &embed).await.unwrap();
        notifier.send("555", &embed).await.unwrap();

        login.assert_async().await;
        lookup.assert_async().await;
        post.assert_async().await;
    }

    #[tokio::test]
    async fn rejects_voice_channels() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server, 1).await;
        let _lookup = server
            .mock("GET", "/channels/777")
            .with_status(200)
            .with_body(r#"{"id": "777", "type": 2}"#)
            .create_async()
            .await;

        let notifier = DiscordNotifier::new(server.url(), Some("test-token".to_string()));
        let err = notifier
            .send("777", &build_notification(&SaleEvent::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, SalesError::ChannelNotSendable { kind: 2, .. }));
    }

    #[tokio::test]
    async fn unknown_channel_fails_send() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server, 1).await;
        let _lookup = server
            .mock("GET", "/channels/404")
            .with_status(404)
            .with_body(r#"{"message": "Unknown Channel", "code": 10003}"#)
            .create_async()
            .await;

        let notifier = DiscordNotifier::new(server.url(), Some("test-token".to_string()));
        let err = notifier
            .send("404", &build_notification(&SaleEvent::default()))
            .await
            .unwrap_err();
        match err {
            SalesError::Discord { action, status, body } => {
                assert_eq!(action, "channel lookup");
                assert_eq!(status, 404);
                assert!(body.contains("Unknown Channel"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_token_fails_every_send() {
        let notifier = DiscordNotifier::new("http://127.0.0.1:1", None);
        let embed = build_notification(&SaleEvent::default());
        for _ in 0..2 {
            let err = notifier.send("1", &embed).await.unwrap_err();
            assert!(matches!(err, SalesError::MissingConfig(_)));
        }
    }
}
