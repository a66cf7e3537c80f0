pub mod cache_entry;
pub mod market_chart;
pub mod market_data;

// Re-export common types
pub use cache_entry::{epoch_seconds, CacheEntry};
pub use market_chart::{BatchMarketChart, CoinSeries, SeriesPoint};
pub use market_data::{DataSource, MarketData, MarketDataResponse, VsCurrency};

/// CoinGecko coin identifier (e.g., "bitcoin", "ethereum")
pub type CoinId = String;
