use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use market_core::VsCurrency;
use market_data_services::{
    CacheStore, CoinGeckoClient, CoinGeckoConfig, FixedInterval, JsonFileCacheStore,
    MarketDataSource, MemoryCacheStore, COINGECKO_API_BASE_URL,
};
use market_proxy::{
    HistoricalSeriesFetcher, MarketChartQuery, MarketDataQuery, MarketSnapshotFetcher,
    SnapshotFetcherConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

/// CoinGecko market data fetcher
///
/// Runs a single listing or historical-series request through the same
/// cache and pacing used by the proxy server and prints the JSON result.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    upstream: UpstreamArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct UpstreamArgs {
    /// CoinGecko API base URL
    #[arg(long, default_value = COINGECKO_API_BASE_URL, global = true)]
    base_url: String,

    /// CoinGecko API key
    #[arg(long, env = "COINGECKO_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Send the API key as a pro-plan key
    #[arg(long, global = true)]
    pro_api: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10", global = true)]
    timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a /coins/markets listing
    Markets {
        /// Quote currency (usd, eur, sek)
        #[arg(short = 'c', long, default_value = "usd")]
        vs_currency: VsCurrency,

        /// Coin ids to restrict the listing to (comma-separated)
        #[arg(short, long)]
        ids: Option<String>,

        #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(1..=250))]
        per_page: u32,

        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Reuse listings cached as JSON files under this directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Seconds a cached listing stays fresh
        #[arg(long, default_value = "300")]
        cache_ttl_secs: u64,
    },
    /// Fetch daily price, market-cap and volume series for several coins
    History {
        /// Coin ids (comma-separated)
        #[arg(required = true, value_delimiter = ',')]
        coin_ids: Vec<String>,

        #[arg(short = 'c', long, default_value = "usd")]
        vs_currency: String,

        #[arg(short, long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=10_000))]
        days: u32,

        /// Spacing between upstream requests in milliseconds
        #[arg(long, default_value = "1500")]
        pacing_interval_ms: u64,
    },
}

impl Cli {
    /// Parse log level from string
    fn parse_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

impl UpstreamArgs {
    fn client_config(&self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone().filter(|key| !key.trim().is_empty()),
            pro_api: self.pro_api,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_max_level(cli.parse_log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    let source: Arc<dyn MarketDataSource> =
        Arc::new(CoinGeckoClient::new(cli.upstream.client_config())?);

    let output = match cli.command {
        Command::Markets {
            vs_currency,
            ids,
            per_page,
            page,
            cache_dir,
            cache_ttl_secs,
        } => {
            let cache: Arc<dyn CacheStore> = match cache_dir {
                Some(dir) => Arc::new(JsonFileCacheStore::new(dir)),
                None => Arc::new(MemoryCacheStore::default()),
            };
            let fetcher = MarketSnapshotFetcher::new(
                source,
                cache,
                SnapshotFetcherConfig {
                    cache_ttl: Duration::from_secs(cache_ttl_secs),
                },
            );

            let query = MarketDataQuery {
                vs_currency,
                ids,
                per_page,
                page,
            };
            info!("Fetching market listing: {:?}", query);

            let response = fetcher
                .get_market_data(&query)
                .await
                .context("Market listing request failed")?;
            info!("Received {} records ({:?})", response.data.len(), response.source);
            serde_json::to_string_pretty(&response)?
        }
        Command::History {
            coin_ids,
            vs_currency,
            days,
            pacing_interval_ms,
        } => {
            let pacer = Arc::new(FixedInterval::new(Duration::from_millis(pacing_interval_ms)));
            let fetcher = HistoricalSeriesFetcher::new(source, pacer);

            let query = MarketChartQuery {
                coin_ids,
                vs_currency,
                days,
            };
            info!(
                "Fetching {} days of history for {} coins",
                query.days,
                query.coin_ids.len()
            );

            let result = fetcher.get_batch_market_chart(&query).await;
            for (coin_id, message) in &result.errors {
                tracing::warn!("{}: {}", coin_id, message);
            }
            serde_json::to_string_pretty(&result)?
        }
    };

    println!("{}", output);
    Ok(())
}
