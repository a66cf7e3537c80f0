use market_core::VsCurrency;
use market_proxy::{MarketChartQuery, MarketDataQuery};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 Success Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub result: Value,
}

/// JSON-RPC 2.0 Error Response
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub error: ErrorObject,
}

/// JSON-RPC Error Object
#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Custom error code for provider failures; `data.status` carries the HTTP status
pub const UPSTREAM_ERROR: i32 = -32010;

// Methods
pub const METHOD_MARKET_DATA: &str = "coingecko.market_data";
pub const METHOD_BATCH_MARKET_CHART: &str = "historical_data.batch_market_chart";

pub const MAX_PER_PAGE: u32 = 250;
pub const MAX_DAYS: u32 = 10_000;

/// `coingecko.market_data` parameters with defaults
#[derive(Debug, Deserialize)]
pub struct MarketDataParams {
    #[serde(default)]
    pub vs_currency: VsCurrency,
    #[serde(default)]
    pub ids: Option<String>,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_per_page() -> u32 {
    100
}
fn default_page() -> u32 {
    1
}

impl MarketDataParams {
    /// Range-check the parameters and turn them into a fetcher query
    pub fn validate(self) -> Result<MarketDataQuery, RpcError> {
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(RpcError::InvalidParams(format!(
                "per_page must be between 1 and {}, got {}",
                MAX_PER_PAGE, self.per_page
            )));
        }
        if self.page < 1 {
            return Err(RpcError::InvalidParams(format!(
                "page must be at least 1, got {}",
                self.page
            )));
        }

        Ok(MarketDataQuery {
            vs_currency: self.vs_currency,
            ids: self.ids,
            per_page: self.per_page,
            page: self.page,
        })
    }
}

/// `historical_data.batch_market_chart` parameters
#[derive(Debug, Deserialize)]
pub struct BatchMarketChartParams {
    pub coin_ids: Vec<String>,
    pub vs_currency: String,
    pub days: u32,
}

impl BatchMarketChartParams {
    /// Range-check the parameters and turn them into a fetcher query
    pub fn validate(self) -> Result<MarketChartQuery, RpcError> {
        if self.coin_ids.is_empty() {
            return Err(RpcError::InvalidParams(
                "coin_ids list cannot be empty".to_string(),
            ));
        }
        if self.vs_currency.trim().is_empty() {
            return Err(RpcError::InvalidParams(
                "vs_currency cannot be empty".to_string(),
            ));
        }
        if !(1..=MAX_DAYS).contains(&self.days) {
            return Err(RpcError::InvalidParams(format!(
                "days must be between 1 and {}, got {}",
                MAX_DAYS, self.days
            )));
        }

        Ok(MarketChartQuery {
            coin_ids: self.coin_ids,
            vs_currency: self.vs_currency,
            days: self.days,
        })
    }
}
