use thiserror::Error;

pub const API_KEY_URL: &str = "https://docs.opensea.io/reference/request-an-api-key";

/// Errors raised while fetching sales or delivering notifications.
#[derive(Debug, Error)]
pub enum SalesError {
    /// A setting needed at send time was not configured.
    #[error("{0} not set")]
    MissingConfig(&'static str),

    /// Transport failure talking to OpenSea or Discord.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The sales response was not the expected JSON document.
    #[error("failed to parse OpenSea response (status {status}): {source}")]
    Parse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// OpenSea answered with its edge proxy block page.
    #[error(
        "You are being rate-limited by OpenSea. Please retrieve an OpenSea API token here: {}",
        API_KEY_URL
    )]
    RateLimited,

    /// Discord rejected a request.
    #[error("Discord {action} failed with status {status}: {body}")]
    Discord {
        action: &'static str,
        status: u16,
        body: String,
    },

    /// The channel exists but messages cannot be posted to it.
    #[error("channel {id} (type {kind}) is not a text channel")]
    ChannelNotSendable { id: String, kind: u8 },
}
