use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use market_data_services::{
    CacheStore, CoinGeckoClient, JsonFileCacheStore, MarketDataSource, MemoryCacheStore,
};
use market_proxy::{HistoricalSeriesFetcher, MarketSnapshotFetcher};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LinesCodec};

use crate::config::{CacheBackend, ServerConfig};
use crate::error::RpcError;
use crate::handler::MarketProxyHandler;
use crate::protocol::*;

/// Longest request line accepted from a client
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// JSON-RPC server for the market-data proxy
pub struct RpcServer {
    config: ServerConfig,
    handler: Arc<MarketProxyHandler>,
}

impl RpcServer {
    /// Create a new RPC server talking to the configured provider
    pub async fn new(config: ServerConfig) -> Result<Self> {
        tracing::info!("Initializing market proxy components...");

        let source: Arc<dyn MarketDataSource> = Arc::new(
            CoinGeckoClient::new(config.coingecko.clone())
                .context("Failed to initialize CoinGecko client")?,
        );

        let cache: Arc<dyn CacheStore> = match &config.cache {
            CacheBackend::Memory { capacity } => {
                tracing::info!("Using in-memory cache (capacity {})", capacity);
                // Entries past the freshness window are never served, so let moka drop them
                Arc::new(MemoryCacheStore::with_retention(
                    *capacity,
                    config.snapshot.cache_ttl.max(Duration::from_secs(1)),
                ))
            }
            CacheBackend::File { dir } => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .context(format!("Failed to create cache directory {}", dir.display()))?;
                tracing::info!("Using file cache at {}", dir.display());
                Arc::new(JsonFileCacheStore::new(dir))
            }
        };

        let pacer = config
            .pacing
            .build()
            .context("Failed to initialize upstream pacing")?;

        let handler = Arc::new(MarketProxyHandler::new(
            MarketSnapshotFetcher::new(source.clone(), cache, config.snapshot.clone()),
            HistoricalSeriesFetcher::new(source, pacer),
        ));

        tracing::info!("✅ Market proxy components initialized successfully");

        Ok(Self { config, handler })
    }

    /// Create a server around an already assembled handler
    pub fn with_handler(config: ServerConfig, handler: MarketProxyHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Bind the configured address and handle connections
    pub async fn run(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .context(format!("Failed to bind to {}", addr))?;

        self.serve(listener).await
    }

    /// Accept connections from `listener` until the task is dropped
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!("✅ Market proxy JSON-RPC server listening on {}", local_addr);
        tracing::info!("Ready to accept connections");

        loop {
            match listener.accept().await {
                Ok((socket, addr)) => {
                    tracing::debug!("New connection from {}", addr);
                    let handler = Arc::clone(&self.handler);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(socket, addr, handler).await {
                            tracing::error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Handle a single TCP connection, one JSON-RPC request per line
async fn handle_connection(
    socket: TcpStream,
    addr: SocketAddr,
    handler: Arc<MarketProxyHandler>,
) -> Result<()> {
    let mut lines = Framed::new(socket, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));

    while let Some(line) = lines.next().await {
        let line = line.context("Failed to read request line")?;
        if line.trim().is_empty() {
            continue;
        }

        tracing::debug!("Received request from {}: {}", addr, line.trim());

        let response = process_request(&line, &handler).await;
        lines
            .send(response.to_string())
            .await
            .context("Failed to write response")?;

        tracing::debug!("Sent response to {}", addr);
    }

    tracing::debug!("Connection from {} closed", addr);
    Ok(())
}

/// Process a JSON-RPC request
pub async fn process_request(line: &str, handler: &MarketProxyHandler) -> Value {
    // Parse JSON-RPC request
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(req) => req,
        Err(e) => {
            return create_error_response(None, RpcError::ParseError(e.to_string()));
        }
    };

    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return create_error_response(
            request.id,
            RpcError::InvalidRequest("JSON-RPC version must be 2.0".to_string()),
        );
    }

    // Route to method handler
    match request.method.as_str() {
        METHOD_MARKET_DATA => {
            // Every parameter has a default
            let params = request.params.unwrap_or_else(|| Value::Object(Default::default()));
            match parse_params::<MarketDataParams>(params) {
                Ok(params) => respond(request.id, handler.handle_market_data(params).await),
                Err(e) => create_error_response(request.id, e),
            }
        }
        METHOD_BATCH_MARKET_CHART => {
            let params = match request.params {
                Some(params) => params,
                None => {
                    return create_error_response(
                        request.id,
                        RpcError::InvalidParams("Missing params".to_string()),
                    );
                }
            };
            match parse_params::<BatchMarketChartParams>(params) {
                Ok(params) => respond(request.id, handler.handle_batch_market_chart(params).await),
                Err(e) => create_error_response(request.id, e),
            }
        }
        _ => create_error_response(
            request.id,
            RpcError::MethodNotFound(request.method.clone()),
        ),
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError::InvalidParams(e.to_string()))
}

/// Wrap a handler outcome into a success or error response
fn respond<T: Serialize>(id: Option<Value>, outcome: Result<T, RpcError>) -> Value {
    let result = match outcome.and_then(|result| {
        serde_json::to_value(result).map_err(|e| RpcError::InternalError(e.to_string()))
    }) {
        Ok(result) => result,
        Err(e) => return create_error_response(id, e),
    };

    serde_json::json!(JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result,
    })
}

/// Create an error response
fn create_error_response(id: Option<Value>, error: RpcError) -> Value {
    if let RpcError::Upstream(e) = &error {
        tracing::warn!("Upstream failure (status {}): {}", e.status(), e);
    }

    serde_json::json!(JsonRpcError {
        jsonrpc: "2.0".to_string(),
        id,
        error: ErrorObject {
            code: error.code(),
            message: error.to_string(),
            data: error.data(),
        },
    })
}
