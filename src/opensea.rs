use crate::domain::{EventsResponse, SaleEvent, WatchedContract};
use crate::error::SalesError;
use crate::utils::mask_secret;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

const EDGE_PROXY_MARKER: &str = "cloudflare";
const RATE_LIMIT_MARKER: &str = "1020";

pub struct OpenSeaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenSeaClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        if let Some(key) = &api_key {
            info!("🔑 Using OpenSea API key {}", mask_secret(key));
        } else {
            warn!("⚠️  OPENSEA_TOKEN not set - requests may be rate-limited");
        }

        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Sales for `contract` since `occurred_after`, oldest first.
    pub async fn fetch_sales(
        &self,
        contract: &WatchedContract,
        occurred_after: i64,
    ) -> Result<Vec<SaleEvent>, SalesError> {
        let query = build_query(contract, occurred_after);
        debug!(?query, "OpenSea events query");

        let mut request = self
            .client
            .get(format!("{}/events", self.base_url))
            .query(&query);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let sales = parse_events(status, &body)?;
        info!("📦 Found {} events for {}", sales.len(), contract.name);
        Ok(sales)
    }
}

pub fn build_query(contract: &WatchedContract, occurred_after: i64) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("offset", "0".to_string()),
        ("event_type", "successful".to_string()),
        ("only_opensea", "false".to_string()),
        ("occurred_after", occurred_after.to_string()),
        ("collection_slug", contract.slug.to_string()),
    ];

    if !contract.is_shared_storefront() {
        query.push(("asset_contract_address", contract.address.to_string()));
    }

    query
}

/// Parses an events body and reverses it so the oldest sale comes first.
pub fn parse_events(status: StatusCode, body: &str) -> Result<Vec<SaleEvent>, SalesError> {
    match serde_json::from_str::<EventsResponse>(body) {
        Ok(response) => {
            let mut sales = response.asset_events;
            sales.reverse();
            Ok(sales)
        }
        Err(_) if is_rate_limited(body) => Err(SalesError::RateLimited),
        Err(source) => Err(SalesError::Parse {
            status: status.as_u16(),
            source,
        }),
    }
}

pub fn is_rate_limited(body: &str) -> bool {
    body.contains(EDGE_PROXY_MARKER) && body.contains(RATE_LIMIT_MARKER)
}
