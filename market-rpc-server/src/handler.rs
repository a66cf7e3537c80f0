use market_core::{BatchMarketChart, MarketDataResponse};
use market_proxy::{HistoricalSeriesFetcher, MarketSnapshotFetcher};
use std::time::Instant;

use crate::error::RpcError;
use crate::protocol::*;

/// Handler for the market-data methods
pub struct MarketProxyHandler {
    snapshots: MarketSnapshotFetcher,
    history: HistoricalSeriesFetcher,
}

impl MarketProxyHandler {
    pub fn new(snapshots: MarketSnapshotFetcher, history: HistoricalSeriesFetcher) -> Self {
        Self { snapshots, history }
    }

    /// Handle a coingecko.market_data request
    pub async fn handle_market_data(
        &self,
        params: MarketDataParams,
    ) -> Result<MarketDataResponse, RpcError> {
        let query = params.validate()?;
        let query_start = Instant::now();

        tracing::debug!(
            "Handling market data: vs_currency={}, ids={:?}, per_page={}, page={}",
            query.vs_currency,
            query.ids,
            query.per_page,
            query.page
        );

        let response = self.snapshots.get_market_data(&query).await?;

        tracing::info!(
            "Market data completed: records={}, source={:?}, duration={}ms",
            response.data.len(),
            response.source,
            query_start.elapsed().as_millis()
        );

        Ok(response)
    }

    /// Handle a historical_data.batch_market_chart request
    pub async fn handle_batch_market_chart(
        &self,
        params: BatchMarketChartParams,
    ) -> Result<BatchMarketChart, RpcError> {
        let query = params.validate()?;

        tracing::debug!(
            "Handling batch market chart: coins={:?}, vs_currency={}, days={}",
            query.coin_ids,
            query.vs_currency,
            query.days
        );

        let (result, metrics) = self.history.get_batch_market_chart_with_metrics(&query).await;

        tracing::info!(
            "Batch market chart completed: data={}, errors={}, duration={}ms",
            result.data.len(),
            result.errors.len(),
            metrics.total_latency_ms
        );

        Ok(result)
    }
}
