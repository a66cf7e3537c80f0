pub mod coingecko_client;

use async_trait::async_trait;
use market_core::UpstreamError;
use serde_json::Value;

// Re-export commonly used items
pub use coingecko_client::{CoinGeckoClient, CoinGeckoConfig, COINGECKO_API_BASE_URL};

/// Read-only access to the market-data provider.
///
/// `path` is relative to the provider's base URL (e.g. `/coins/markets`).
/// Implementations return the parsed JSON body as-is and map every transport
/// or HTTP failure onto [`UpstreamError`].
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError>;
}
