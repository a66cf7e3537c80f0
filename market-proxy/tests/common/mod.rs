//! In-process fakes shared by the fetcher integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use market_core::UpstreamError;
use market_data_services::{CacheError, CacheStore, MarketDataSource, Pacer};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One recorded upstream call: path plus query pairs
pub type RecordedCall = (String, Vec<(String, String)>);

/// Upstream stand-in answering from a path → response table.
///
/// Unknown paths answer 404 like CoinGecko does for unknown coins.
#[derive(Default)]
pub struct FakeSource {
    responses: Mutex<HashMap<String, Result<Value, UpstreamError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Duration,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call takes `latency` before answering
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn respond(&self, path: &str, response: Result<Value, UpstreamError>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MarketDataSource for FakeSource {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        self.calls.lock().unwrap().push((
            path.to_string(),
            query
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        ));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(UpstreamError::from_status(path, 404, r#"{"error":"coin not found"}"#)))
    }
}

/// Cache store whose reads and/or writes always fail
pub struct BrokenCache {
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub writes: AtomicUsize,
    inner: Mutex<HashMap<String, Value>>,
}

impl BrokenCache {
    pub fn new(fail_reads: bool, fail_writes: bool) -> Self {
        Self {
            fail_reads,
            fail_writes,
            writes: AtomicUsize::new(0),
            inner: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CacheStore for BrokenCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        if self.fail_reads {
            return Err(CacheError::Backend("storage unavailable".to_string()));
        }
        Ok(self.inner.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(CacheError::Backend("storage is read-only".to_string()));
        }
        self.inner.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

/// Pacer that only counts how often it was consulted
#[derive(Default)]
pub struct CountingPacer {
    pub calls: AtomicUsize,
    pub finished: AtomicUsize,
}

impl CountingPacer {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn finished_count(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Pacer for CountingPacer {
    async fn until_ready(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn finished(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

/// A `/coins/markets` style listing
pub fn markets_body(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .enumerate()
            .map(|(rank, id)| {
                json!({
                    "id": id,
                    "symbol": &id[..3.min(id.len())],
                    "name": id.to_uppercase(),
                    "image": format!("https://assets.coingecko.com/coins/images/{}.png", id),
                    "current_price": 1000.0 * (rank + 1) as f64,
                    "market_cap_rank": rank + 1,
                    "max_supply": null,
                    "roi": null,
                    "last_updated": "2026-10-18T09:00:00.000Z"
                })
            })
            .collect(),
    )
}

/// A `/coins/{id}/market_chart` body with `points` entries per series
pub fn market_chart_body(points: usize) -> Value {
    let series: Vec<Value> = (0..points)
        .map(|i| json!([1_760_000_000_000u64 + i as u64 * 86_400_000, 100.0 + i as f64]))
        .collect();
    json!({
        "prices": series,
        "market_caps": series,
        "total_volumes": series,
    })
}

pub fn chart_path(coin_id: &str) -> String {
    format!("/coins/{}/market_chart", coin_id)
}
