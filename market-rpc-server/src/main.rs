use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use market_data_services::{CoinGeckoConfig, PacingPolicy, COINGECKO_API_BASE_URL};
use market_proxy::SnapshotFetcherConfig;
use market_rpc_server::{CacheBackend, RpcServer, ServerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PacingMode {
    /// Minimum spacing between upstream calls
    Fixed,
    /// Token bucket refilled per minute
    TokenBucket,
    /// No pacing
    None,
}

#[derive(Parser, Debug)]
#[command(name = "market-rpc-server")]
#[command(about = "JSON-RPC proxy for CoinGecko market data")]
struct Cli {
    /// Server host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to bind to
    #[arg(long, default_value = "7879")]
    port: u16,

    /// CoinGecko API base URL
    #[arg(long, default_value = COINGECKO_API_BASE_URL)]
    base_url: String,

    /// CoinGecko API key
    #[arg(long, env = "COINGECKO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Send the API key as a pro-plan key
    #[arg(long)]
    pro_api: bool,

    /// Per-request upstream timeout in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// How long a cached listing may be served, in seconds
    #[arg(long, default_value = "300")]
    cache_ttl_secs: u64,

    /// Cache listings as JSON files under this directory instead of in memory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Maximum entries held by the in-memory cache
    #[arg(long, default_value = "10000")]
    cache_capacity: u64,

    /// Pacing applied to historical series requests
    #[arg(long, value_enum, default_value = "fixed")]
    pacing: PacingMode,

    /// Spacing between paced requests in milliseconds
    #[arg(long, default_value = "1500")]
    pacing_interval_ms: u64,

    /// Request budget for token-bucket pacing
    #[arg(long, default_value = "30")]
    requests_per_minute: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let cache = match self.cache_dir {
            Some(dir) => CacheBackend::File { dir },
            None => CacheBackend::Memory {
                capacity: self.cache_capacity,
            },
        };

        let pacing = match self.pacing {
            PacingMode::Fixed => PacingPolicy::Fixed(Duration::from_millis(self.pacing_interval_ms)),
            PacingMode::TokenBucket => PacingPolicy::TokenBucket {
                requests_per_minute: self.requests_per_minute,
            },
            PacingMode::None => PacingPolicy::Unpaced,
        };

        ServerConfig {
            host: self.host,
            port: self.port,
            coingecko: CoinGeckoConfig {
                base_url: self.base_url,
                api_key: self.api_key.filter(|key| !key.trim().is_empty()),
                pro_api: self.pro_api,
                timeout: Duration::from_secs(self.timeout_secs),
            },
            cache,
            snapshot: SnapshotFetcherConfig {
                cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            },
            pacing,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "market_rpc_server={},market_proxy={},market_data_services={}",
                cli.log_level, cli.log_level, cli.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Market Proxy JSON-RPC Server Starting");
    tracing::info!("Configuration:");
    tracing::info!("  Host: {}", cli.host);
    tracing::info!("  Port: {}", cli.port);
    tracing::info!("  Upstream: {}", cli.base_url);
    tracing::info!("  API key: {}", if cli.api_key.is_some() { "set" } else { "none" });
    tracing::info!("  Cache TTL: {}s", cli.cache_ttl_secs);
    match &cli.cache_dir {
        Some(dir) => tracing::info!("  Cache: file ({})", dir.display()),
        None => tracing::info!("  Cache: memory ({} entries)", cli.cache_capacity),
    }
    tracing::info!("  Pacing: {:?}", cli.pacing);

    let server = RpcServer::new(cli.into_config()).await?;
    server.run().await?;

    Ok(())
}
