use crate::domain::WatchedContract;
use crate::notifier::{Notifier, NotifierHub};
use crate::opensea::OpenSeaClient;
use crate::window::window_start;
use anyhow::Result;
use tracing::info;

pub struct SalesWatcher<N> {
    contracts: Vec<WatchedContract>,
    opensea: OpenSeaClient,
    notifier: NotifierHub<N>,
    lookback_seconds: u64,
}

impl<N: Notifier> SalesWatcher<N> {
    pub fn new(
        contracts: Vec<WatchedContract>,
        opensea: OpenSeaClient,
        notifier: NotifierHub<N>,
        lookback_seconds: u64,
    ) -> Self {
        Self {
            contracts,
            opensea,
            notifier,
            lookback_seconds,
        }
    }

    /// Processes every contract in order; the first error aborts the run.
    pub async fn run(&self) -> Result<usize> {
        info!(
            "👁️  Watching {} contracts, posting to {} channels",
            self.contracts.len(),
            self.notifier.channel_ids().len()
        );

        let mut delivered = 0;
        for contract in &self.contracts {
            let occurred_after = window_start(self.lookback_seconds);
            info!(
                "🔎 Fetching {} ({}, slug {}) since {}",
                contract.name, contract.address, contract.slug, occurred_after
            );

            let sales = self.opensea.fetch_sales(contract, occurred_after).await?;
            let report = self.notifier.dispatch(&sales).await?;
            delivered += report.into_result()?;
        }

        if delivered == 0 {
            info!("😴 No recent sales");
        }
        Ok(delivered)
    }
}
