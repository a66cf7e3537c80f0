use market_core::{
    epoch_seconds, CacheEntry, DataSource, MarketData, MarketDataResponse, UpstreamError,
    VsCurrency,
};
use market_data_services::{CacheStore, MarketDataSource};
use std::sync::Arc;
use std::time::Duration;

pub const MARKETS_ENDPOINT: &str = "/coins/markets";

/// How long a cached listing may be served
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct SnapshotFetcherConfig {
    pub cache_ttl: Duration,
}

impl Default for SnapshotFetcherConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Parameters of a `/coins/markets` listing.
///
/// Range checks (`per_page` 1..=250, `page` >= 1) belong to the caller's
/// boundary layer; the fetcher forwards whatever it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataQuery {
    pub vs_currency: VsCurrency,
    /// Comma-separated coin ids, forwarded verbatim
    pub ids: Option<String>,
    pub per_page: u32,
    pub page: u32,
}

impl Default for MarketDataQuery {
    fn default() -> Self {
        Self {
            vs_currency: VsCurrency::Usd,
            ids: None,
            per_page: 100,
            page: 1,
        }
    }
}

impl MarketDataQuery {
    fn ids(&self) -> Option<&str> {
        self.ids.as_deref().filter(|ids| !ids.is_empty())
    }

    /// Cache key: `market_data_{currency}_{ids}_{per_page}_{page}`.
    ///
    /// Commas in `ids` become underscores and a missing list becomes `all`.
    /// Order is kept as given, so `bitcoin,ethereum` and `ethereum,bitcoin`
    /// are cached separately.
    pub fn cache_key(&self) -> String {
        let ids = self
            .ids()
            .map(|ids| ids.replace(',', "_"))
            .unwrap_or_else(|| "all".to_string());

        format!(
            "market_data_{}_{}_{}_{}",
            self.vs_currency, ids, self.per_page, self.page
        )
    }

    fn upstream_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("vs_currency", self.vs_currency.to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
            ("sparkline", "false".to_string()),
            ("locale", "en".to_string()),
        ];
        if let Some(ids) = self.ids() {
            params.push(("ids", ids.to_string()));
        }
        params
    }
}

/// Serves `/coins/markets` listings through a time-boxed cache.
///
/// Cache trouble never fails a request: unreadable or malformed entries are
/// misses, and a failed write only costs the next caller an upstream call.
pub struct MarketSnapshotFetcher {
    source: Arc<dyn MarketDataSource>,
    cache: Arc<dyn CacheStore>,
    config: SnapshotFetcherConfig,
}

impl MarketSnapshotFetcher {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        cache: Arc<dyn CacheStore>,
        config: SnapshotFetcherConfig,
    ) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    /// Return the listing for `query`, from cache when a fresh entry exists
    pub async fn get_market_data(
        &self,
        query: &MarketDataQuery,
    ) -> Result<MarketDataResponse, UpstreamError> {
        let cache_key = query.cache_key();

        if let Some(entry) = self.lookup(&cache_key).await {
            let now = epoch_seconds();
            match entry.fresh_data(self.config.cache_ttl, now) {
                Some(records) => {
                    tracing::debug!("Returning cached data for {}", cache_key);
                    return Ok(MarketDataResponse {
                        data: records.to_vec(),
                        source: DataSource::Cache,
                    });
                }
                None if entry.timestamp.is_none() || entry.data.is_none() => {
                    tracing::info!(
                        "Cache invalid for {} (missing timestamp or data). Re-fetching.",
                        cache_key
                    );
                }
                None => {
                    tracing::info!(
                        "Cache expired for {} (age {:.0}s). Re-fetching.",
                        cache_key,
                        entry.age_secs(now).unwrap_or_default()
                    );
                }
            }
        }

        let raw = self
            .source
            .get_json(MARKETS_ENDPOINT, &query.upstream_params())
            .await?;

        let records: Vec<MarketData> = serde_json::from_value(raw).map_err(|e| {
            UpstreamError::Validation(format!("{} listing could not be decoded: {}", MARKETS_ENDPOINT, e))
        })?;

        self.store(&cache_key, CacheEntry::now(records.clone())).await;

        tracing::info!(
            "Fetched fresh data from CoinGecko for {} ({} records) and cached it",
            cache_key,
            records.len()
        );

        Ok(MarketDataResponse {
            data: records,
            source: DataSource::Live,
        })
    }

    /// Read and decode a cache entry; every failure is reported as a miss
    async fn lookup(&self, cache_key: &str) -> Option<CacheEntry> {
        match self.cache.get(cache_key).await {
            Ok(Some(value)) => {
                let entry = CacheEntry::from_value(value);
                if entry.is_none() {
                    tracing::warn!("Malformed cache entry for {}. Assuming cache miss.", cache_key);
                }
                entry
            }
            Ok(None) => {
                tracing::debug!("Cache miss for {}", cache_key);
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Error retrieving cache for {}: {}. Assuming cache miss.",
                    cache_key,
                    e
                );
                None
            }
        }
    }

    async fn store(&self, cache_key: &str, entry: CacheEntry) {
        if let Err(e) = self.cache.put(cache_key, entry.to_value()).await {
            tracing::warn!("Failed to write cache entry for {}: {}", cache_key, e);
        }
    }
}
