use market_data_services::{CoinGeckoConfig, PacingPolicy};
use market_proxy::SnapshotFetcherConfig;
use std::path::PathBuf;

/// Where snapshot listings are cached
#[derive(Debug, Clone, PartialEq)]
pub enum CacheBackend {
    /// In-process moka cache bounded to `capacity` entries
    Memory { capacity: u64 },
    /// One JSON document per key under `dir`
    File { dir: PathBuf },
}

impl Default for CacheBackend {
    fn default() -> Self {
        CacheBackend::Memory { capacity: 10_000 }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub coingecko: CoinGeckoConfig,
    pub cache: CacheBackend,
    pub snapshot: SnapshotFetcherConfig,
    pub pacing: PacingPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7879,
            coingecko: CoinGeckoConfig::default(),
            cache: CacheBackend::default(),
            snapshot: SnapshotFetcherConfig::default(),
            pacing: PacingPolicy::default(),
        }
    }
}
