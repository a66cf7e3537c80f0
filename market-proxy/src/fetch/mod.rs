pub mod history;
pub mod metrics;
pub mod snapshot;

// Re-export commonly used items
pub use history::{coin_error_message, HistoricalSeriesFetcher, MarketChartQuery};
pub use metrics::BatchMetrics;
pub use snapshot::{
    MarketDataQuery, MarketSnapshotFetcher, SnapshotFetcherConfig, DEFAULT_CACHE_TTL,
    MARKETS_ENDPOINT,
};
