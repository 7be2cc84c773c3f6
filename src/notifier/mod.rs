mod discord;

pub use discord::{DiscordNotifier, DiscordSession, TextChannel};

use crate::domain::SaleEvent;
use crate::embed::{build_notification, Embed};
use crate::error::SalesError;
use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{error, info};

/// A chat backend that can post an embed to a channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel_id: &str, embed: &Embed) -> Result<(), SalesError>;
}

#[derive(Debug)]
pub struct DeliveryOutcome {
    pub channel_id: String,
    pub title: String,
    pub result: Result<(), SalesError>,
}

/// Every delivery attempted for one batch of sales.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// Number of deliveries, or the first failure in initiation order.
    pub fn into_result(self) -> Result<usize, SalesError> {
        let delivered = self.delivered();
        match self.outcomes.into_iter().find_map(|o| o.result.err()) {
            Some(err) => Err(err),
            None => Ok(delivered),
        }
    }
}

/// Fans every sale out to every configured channel.
pub struct NotifierHub<N> {
    notifier: N,
    channel_ids: Vec<String>,
}

impl<N: Notifier> NotifierHub<N> {
    pub fn new(notifier: N, channel_ids: Vec<String>) -> Self {
        Self {
            notifier,
            channel_ids,
        }
    }

    pub fn channel_ids(&self) -> &[String] {
        &self.channel_ids
    }

    /// Delivers all `sales` concurrently and waits for every send to settle.
    pub async fn dispatch(&self, sales: &[SaleEvent]) -> Result<DispatchReport, SalesError> {
        if sales.is_empty() {
            return Ok(DispatchReport::default());
        }
        if self.channel_ids.is_empty() {
            return Err(SalesError::MissingConfig("DISCORD_CHANNEL_ID"));
        }

        let per_sale = join_all(sales.iter().map(|sale| self.deliver_sale(sale))).await;
        let report = DispatchReport {
            outcomes: per_sale.into_iter().flatten().collect(),
        };

        for failure in report.failures() {
            if let Err(e) = &failure.result {
                error!(
                    "❌ Failed to deliver \"{}\" to channel {}: {}",
                    failure.title, failure.channel_id, e
                );
            }
        }
        info!(
            "✅ Delivered {}/{} messages",
            report.delivered(),
            report.outcomes.len()
        );

        Ok(report)
    }

    async fn deliver_sale(&self, sale: &SaleEvent) -> Vec<DeliveryOutcome> {
        let embed = build_notification(sale);
        info!("🛒 {}", embed.title);

        let sends = self.channel_ids.iter().map(|channel_id| {
            let embed = &embed;
            async move {
                DeliveryOutcome {
                    channel_id: channel_id.clone(),
                    title: embed.title.clone(),
                    result: self.notifier.send(channel_id, embed).await,
                }
            }
        });

        join_all(sends).await
    }
}
