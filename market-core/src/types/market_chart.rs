use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::UpstreamError;
use crate::types::CoinId;

/// One `[timestamp_ms, value]` pair, kept in the upstream wire shape
pub type SeriesPoint = Vec<Value>;

/// Historical series for a single coin, as returned by `/coins/{id}/market_chart`.
///
/// Empty lists are valid and mean the window had no data points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSeries {
    pub prices: Vec<SeriesPoint>,
    pub market_caps: Vec<SeriesPoint>,
    pub total_volumes: Vec<SeriesPoint>,
}

impl CoinSeries {
    /// Extract the three series from a raw market-chart body.
    ///
    /// Fails with `Validation` when any series is missing or is not a list
    /// of lists.
    pub fn from_market_chart(body: &Value) -> Result<Self, UpstreamError> {
        Ok(Self {
            prices: Self::series_field(body, "prices")?,
            market_caps: Self::series_field(body, "market_caps")?,
            total_volumes: Self::series_field(body, "total_volumes")?,
        })
    }

    fn series_field(body: &Value, key: &str) -> Result<Vec<SeriesPoint>, UpstreamError> {
        let points = body
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| UpstreamError::Validation(format!("missing or non-list field '{}'", key)))?;

        points
            .iter()
            .map(|point| {
                point.as_array().cloned().ok_or_else(|| {
                    UpstreamError::Validation(format!("non-list data point in '{}'", key))
                })
            })
            .collect()
    }

    /// Total number of data points across the three series
    pub fn point_count(&self) -> usize {
        self.prices.len() + self.market_caps.len() + self.total_volumes.len()
    }
}

/// Result of a batch market-chart request.
///
/// Every requested coin ends up in exactly one of `data` or `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMarketChart {
    #[serde(default)]
    pub data: BTreeMap<CoinId, CoinSeries>,
    #[serde(default)]
    pub errors: BTreeMap<CoinId, String>,
}

impl BatchMarketChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record series for a coin, clearing any earlier error for it
    pub fn record_success(&mut self, coin_id: &str, series: CoinSeries) {
        self.errors.remove(coin_id);
        self.data.insert(coin_id.to_string(), series);
    }

    /// Record a failure for a coin, clearing any earlier series for it
    pub fn record_failure(&mut self, coin_id: &str, message: String) {
        self.data.remove(coin_id);
        self.errors.insert(coin_id.to_string(), message);
    }

    /// Number of coins accounted for (successes plus failures)
    pub fn len(&self) -> usize {
        self.data.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.errors.is_empty()
    }
}
