use serde::{Deserialize, Deserializer};

/// OpenSea's shared storefront contract backs many unrelated collections, so
/// sales on it are filtered by slug only.
pub const OPENSEA_SHARED_STOREFRONT_ADDRESS: &str = "0x495f947276749Ce646f68AC8c248420045cb7b5e";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedContract {
    pub name: &'static str,
    pub address: &'static str,
    pub slug: &'static str,
}

impl WatchedContract {
    pub fn is_shared_storefront(&self) -> bool {
        self.address == OPENSEA_SHARED_STOREFRONT_ADDRESS
    }
}

pub const WATCHED_CONTRACTS: &[WatchedContract] = &[
    WatchedContract {
        name: "Immortal Phoenix",
        address: "0x7abc458a355beb1866bbf3563d48ad5a1c904621",
        slug: "immortalphoenix",
    },
    WatchedContract {
        name: "Planet XV",
        address: "0x4f80327c8dc498c4d8234d71bed1023230a5b785",
        slug: "planetxv",
    },
];

#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    pub asset_events: Vec<SaleEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleEvent {
    #[serde(default)]
    pub asset: Option<Asset>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_price: Option<String>,
    #[serde(default)]
    pub winner_account: Option<Account>,
    #[serde(default)]
    pub seller: Option<Account>,
    #[serde(default)]
    pub created_date: Option<String>,
}

impl SaleEvent {
    pub fn buyer_address(&self) -> Option<&str> {
        self.winner_account.as_ref()?.address.as_deref()
    }

    pub fn seller_address(&self) -> Option<&str> {
        self.seller.as_ref()?.address.as_deref()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Wei amounts normally arrive as strings but may come as bare JSON numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Number(number) => number.to_string(),
    }))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub collection: Option<Collection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{EventsResponse, WatchedContract, OPENSEA_SHARED_STOREFRONT_ADDRESS, WATCHED_CONTRACTS};

    #[test]
    fn watched_contracts_are_not_shared_storefront() {
        assert_eq!(WATCHED_CONTRACTS.len(), 2);
        assert!(WATCHED_CONTRACTS.iter().all(|c| !c.is_shared_storefront()));
    }

    #[test]
    fn recognizes_shared_storefront() {
        let contract = WatchedContract {
            name: "Storefront drop",
            address: OPENSEA_SHARED_STOREFRONT_ADDRESS,
            slug: "some-drop",
        };
        assert!(contract.is_shared_storefront());
    }

    #[test]
    fn deserializes_sale_event_and_ignores_unknown_fields() {
        let body = r#"{
            "asset_events": [{
                "id": 991,
                "event_type": "successful",
                "asset": {
                    "name": "Planet #42",
                    "permalink": "https://opensea.io/assets/0x4f80/42",
                    "image_url": "https://img.example/42.png",
                    "collection": {"image_url": "https://img.example/col.png", "slug": "planetxv"}
                },
                "total_price": "250000000000000000",
                "winner_account": {"address": "0xbuyer"},
                "seller": {"address": "0xseller"},
                "created_date": "2021-10-05T12:34:56.123456"
            }]
        }"#;

        let response: EventsResponse = serde_json::from_str(body).unwrap();
        let sale = &response.asset_events[0];
        assert_eq!(sale.asset.as_ref().unwrap().name.as_deref(), Some("Planet #42"));
        assert_eq!(sale.total_price.as_deref(), Some("250000000000000000"));
        assert_eq!(sale.buyer_address(), Some("0xbuyer"));
        assert_eq!(sale.seller_address(), Some("0xseller"));
    }

    #[test]
    fn tolerates_nulls() {
        let body = r#"{"asset_events": [{"asset": {"name": null}, "winner_account": null, "seller": {"address": null}}]}"#;
        let response: EventsResponse = serde_json::from_str(body).unwrap();
        let sale = &response.asset_events[0];
        assert!(sale.asset.as_ref().unwrap().name.is_none());
        assert_eq!(sale.buyer_address(), None);
        assert_eq!(sale.seller_address(), None);
        assert!(sale.total_price.is_none());
    }

    #[test]
    fn accepts_numeric_total_price() {
        let body = r#"{"asset_events": [{"total_price": 1000}, {"total_price": "2000"}, {"total_price": null}]}"#;
        let response: EventsResponse = serde_json::from_str(body).unwrap();
        let prices: Vec<_> = response
            .asset_events
            .iter()
            .map(|s| s.total_price.as_deref())
            .collect();
        assert_eq!(prices, vec![Some("1000"), Some("2000"), None]);
    }

    #[test]
    fn requires_asset_events() {
        let result = serde_json::from_str::<EventsResponse>(r#"{"detail": "nope"}"#);
        assert!(result.is_err());
    }
}
