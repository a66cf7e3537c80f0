pub mod fetch;

// Re-export commonly used items from fetch module
pub use fetch::{
    coin_error_message, BatchMetrics, HistoricalSeriesFetcher, MarketChartQuery,
    MarketDataQuery, MarketSnapshotFetcher, SnapshotFetcherConfig, DEFAULT_CACHE_TTL,
    MARKETS_ENDPOINT,
};
