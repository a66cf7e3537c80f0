pub mod cache;
pub mod pacing;
pub mod upstream;

// Re-export commonly used items
pub use cache::{CacheError, CacheStore, JsonFileCacheStore, MemoryCacheStore};
pub use pacing::{FixedInterval, Pacer, PacingPolicy, TokenBucket, Unpaced};
pub use upstream::{CoinGeckoClient, CoinGeckoConfig, MarketDataSource, COINGECKO_API_BASE_URL};
