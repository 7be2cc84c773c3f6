use crate::domain::SaleEvent;
use chrono::{DateTime, NaiveDateTime, Utc};
use ethers_core::types::U256;
use ethers_core::utils::format_ether;
use serde::Serialize;
use tracing::warn;

pub const UNNAMED_NFT: &str = "Unnamed NFT";
pub const ETHER_SYMBOL: &str = "\u{039e}";
/// Discord refuses empty field values; a zero-width space renders blank.
pub const BLANK_FIELD: &str = "\u{200b}";

const EMBED_COLOR: u32 = 0x0099ff;
const AUTHOR_NAME: &str = "Project X Sales Bot";
const AUTHOR_ICON_URL: &str = "https://lh3.googleusercontent.com/pOAlgQz3eoClmN0RrVT2xNsqPLO2x5AqMAYK6IrN1lKM54gkretoGiThgpPppdxzbcfiFPNLBedA8MnmIUIV6HyQ_Yixs4zfQnwU=s130";
const AUTHOR_URL: &str = "https://opensea.io/collection/planetxv";
const FOOTER_TEXT: &str = "Sold on OpenSea";
const FOOTER_ICON_URL: &str = "https://files.readme.io/566c72b-opensea-logomark-full-colored.png";

/// A Discord rich embed describing one sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: u32,
    pub author: EmbedAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: String,
}

pub fn build_notification(sale: &SaleEvent) -> Embed {
    let asset = sale.asset.clone().unwrap_or_default();
    let name = asset.name.unwrap_or_else(|| UNNAMED_NFT.to_string());

    Embed {
        title: format!("{name} sold!"),
        url: asset.permalink,
        color: EMBED_COLOR,
        author: EmbedAuthor {
            name: AUTHOR_NAME.to_string(),
            icon_url: AUTHOR_ICON_URL.to_string(),
            url: AUTHOR_URL.to_string(),
        },
        thumbnail: asset
            .collection
            .and_then(|c| c.image_url)
            .map(|url| EmbedImage { url }),
        fields: vec![
            field("Name", &name),
            field("Amount", &format_price(sale.total_price.as_deref())),
            field("Buyer", sale.buyer_address().unwrap_or_default()),
            field("Seller", sale.seller_address().unwrap_or_default()),
        ],
        image: asset.image_url.map(|url| EmbedImage { url }),
        timestamp: sale.created_date.as_deref().and_then(parse_created_date),
        footer: EmbedFooter {
            text: FOOTER_TEXT.to_string(),
            icon_url: FOOTER_ICON_URL.to_string(),
        },
    }
}

fn field(name: &str, value: &str) -> EmbedField {
    let value = if value.is_empty() { BLANK_FIELD } else { value };
    EmbedField {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// Converts a wei amount to ether with the ether symbol appended.
pub fn format_price(total_price: Option<&str>) -> String {
    let raw = total_price.map(str::trim).filter(|p| !p.is_empty()).unwrap_or("0");

    match U256::from_dec_str(raw) {
        Ok(wei) => format!("{}{ETHER_SYMBOL}", trim_decimals(&format_ether(wei))),
        Err(e) => {
            warn!("⚠️  Unparseable total_price {:?}: {}", raw, e);
            format!("{raw} wei")
        }
    }
}

fn trim_decimals(amount: &str) -> &str {
    if amount.contains('.') {
        amount.trim_end_matches('0').trim_end_matches('.')
    } else {
        amount
    }
}

/// OpenSea timestamps carry no zone and are UTC.
pub fn parse_created_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
