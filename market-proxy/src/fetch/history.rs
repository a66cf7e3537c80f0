use market_core::{percent_encode, BatchMarketChart, CoinSeries, UpstreamError};
use market_data_services::{MarketDataSource, Pacer};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use super::metrics::BatchMetrics;

/// Parameters of a batch market-chart request
#[derive(Debug, Clone, PartialEq)]
pub struct MarketChartQuery {
    pub coin_ids: Vec<String>,
    pub vs_currency: String,
    pub days: u32,
}

/// Fetches `/coins/{id}/market_chart` for many coins, one at a time.
///
/// Coins are walked strictly in order. Every upstream call waits on the
/// pacer first and reports back to it once it completes. A failing coin
/// lands in `errors` and the batch carries on.
pub struct HistoricalSeriesFetcher {
    source: Arc<dyn MarketDataSource>,
    pacer: Arc<dyn Pacer>,
}

impl HistoricalSeriesFetcher {
    pub fn new(source: Arc<dyn MarketDataSource>, pacer: Arc<dyn Pacer>) -> Self {
        Self { source, pacer }
    }

    /// Fetch series for every coin in `query`
    ///
    /// Never fails as a whole: each coin id ends up either in `data` or in
    /// `errors`. Duplicate ids are fetched once.
    pub async fn get_batch_market_chart(&self, query: &MarketChartQuery) -> BatchMarketChart {
        self.get_batch_market_chart_with_metrics(query).await.0
    }

    /// Same as [`Self::get_batch_market_chart`], also returning timing and
    /// outcome counts for the batch
    pub async fn get_batch_market_chart_with_metrics(
        &self,
        query: &MarketChartQuery,
    ) -> (BatchMarketChart, BatchMetrics) {
        let batch_start = Instant::now();
        let mut result = BatchMarketChart::new();
        let mut metrics = BatchMetrics::new();
        let mut seen = HashSet::new();

        tracing::debug!(
            "Fetching batch market chart: coins={}, vs_currency={}, days={}",
            query.coin_ids.len(),
            query.vs_currency,
            query.days
        );

        for coin_id in &query.coin_ids {
            if !seen.insert(coin_id.as_str()) {
                tracing::debug!("Skipping duplicate coin id '{}'", coin_id);
                continue;
            }

            self.pacer.until_ready().await;

            let started = Instant::now();
            let outcome = self.fetch_coin(coin_id, &query.vs_currency, query.days).await;
            self.pacer.finished().await;

            match outcome {
                Ok(series) => {
                    metrics.record_success(coin_id, started.elapsed(), series.point_count());
                    result.record_success(coin_id, series);
                }
                Err(e) => {
                    let message = coin_error_message(coin_id, &e);
                    tracing::warn!("Market chart failed for '{}' (status {}): {}", coin_id, e.status(), e);
                    metrics.record_failure(coin_id, started.elapsed());
                    result.record_failure(coin_id, message);
                }
            }
        }

        metrics.set_total_latency(batch_start.elapsed());
        metrics.report();

        (result, metrics)
    }

    async fn fetch_coin(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<CoinSeries, UpstreamError> {
        let path = format!("/coins/{}/market_chart", percent_encode(coin_id));
        let params = [
            ("vs_currency", vs_currency.to_string()),
            ("days", days.to_string()),
        ];

        let body = self.source.get_json(&path, &params).await?;
        CoinSeries::from_market_chart(&body)
    }
}

/// Per-coin message recorded in `errors` for a failed fetch
pub fn coin_error_message(coin_id: &str, error: &UpstreamError) -> String {
    match error {
        UpstreamError::NotFound { .. } => format!("Coin '{}' not found on CoinGecko.", coin_id),
        UpstreamError::RateLimited { .. } => format!(
            "Rate limited by CoinGecko for coin '{}'. Try again later.",
            coin_id
        ),
        UpstreamError::Timeout { .. } => {
            format!("Request to CoinGecko timed out for coin '{}'.", coin_id)
        }
        UpstreamError::Network { message, .. } => format!(
            "Network error while fetching data for '{}': {}",
            coin_id, message
        ),
        UpstreamError::Validation(_) => format!(
            "Unexpected data structure received from CoinGecko for {}.",
            coin_id
        ),
        UpstreamError::Internal(message) => format!(
            "An unexpected error occurred while processing data for '{}': {}",
            coin_id, message
        ),
        UpstreamError::BadRequest { .. }
        | UpstreamError::Unauthorized { .. }
        | UpstreamError::Forbidden { .. }
        | UpstreamError::Upstream { .. } => format!(
            "Error from CoinGecko for '{}' (status {}): {}",
            coin_id,
            error.status(),
            error.detail().unwrap_or_default()
        ),
    }
}
