use anyhow::{Context, Result};
use async_trait::async_trait;
use market_core::UpstreamError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;

use super::MarketDataSource;

pub const COINGECKO_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Configuration for the CoinGecko client
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Send the key as a pro-plan key instead of a demo key
    pub pro_api: bool,
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_BASE_URL.to_string(),
            api_key: None,
            pro_api: false,
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the CoinGecko v3 REST API
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    /// Create a new client from configuration
    ///
    /// # Arguments
    /// * `config` - base URL, optional API key and per-request timeout
    ///
    /// # Returns
    /// A client whose every request is bounded by `config.timeout`
    pub fn new(config: CoinGeckoConfig) -> Result<Self> {
        tracing::info!(
            "Initializing CoinGecko client: base_url={}, timeout={:?}, api_key={}",
            config.base_url,
            config.timeout,
            if config.api_key.is_some() { "set" } else { "none" }
        );

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let header_name = if config.pro_api {
                "x-cg-pro-api-key"
            } else {
                "x-cg-demo-api-key"
            };
            let value = HeaderValue::from_str(key).context("API key is not a valid header value")?;
            headers.insert(header_name, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(concat!("market-data-services/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn transport_error(path: &str, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout {
                endpoint: path.to_string(),
            }
        } else {
            UpstreamError::Network {
                endpoint: path.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Fetching CoinGecko data: url={}, params={:?}", url, query);

        let response = self.http.get(&url).query(query).send().await.map_err(|e| {
            let err = Self::transport_error(path, e);
            tracing::warn!("CoinGecko request failed: url={}, params={:?}: {}", url, query, err);
            err
        })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            tracing::warn!(
                "CoinGecko HTTP error: status={}, url={}, params={:?}, detail={}",
                status.as_u16(),
                url,
                query,
                market_core::truncate_detail(&body)
            );
            return Err(UpstreamError::from_status(path, status.as_u16(), &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::transport_error(path, e))?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("CoinGecko returned non-JSON body: url={}: {}", url, e);
            UpstreamError::Validation(format!("response from {} is not valid JSON: {}", path, e))
        })
    }
}
