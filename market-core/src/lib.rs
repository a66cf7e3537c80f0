pub mod encoding;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use encoding::percent_encode;
pub use error::{truncate_detail, UpstreamError, DETAIL_MAX_CHARS};
pub use types::{
    epoch_seconds, BatchMarketChart, CacheEntry, CoinId, CoinSeries, DataSource, MarketData,
    MarketDataResponse, SeriesPoint, VsCurrency,
};
