//! Batch Fetch Metrics
//!
//! Tracks one historical batch request:
//! - Per-coin upstream latency
//! - Success / failure counts
//! - Data points returned
//! - Wall-clock time of the whole batch, pacing waits included

use std::time::Duration;

/// Metrics for a single batch market-chart request
#[derive(Debug, Clone, Default)]
pub struct BatchMetrics {
    /// Wall-clock time for the whole batch, pacing included (milliseconds)
    pub total_latency_ms: u64,

    /// Upstream latency per coin, in processing order (milliseconds)
    pub coin_latencies_ms: Vec<(String, u64)>,

    /// Coins whose series were returned
    pub succeeded: usize,

    /// Coins recorded in the error map
    pub failed: usize,

    /// Data points across all returned series
    pub data_points: usize,
}

impl BatchMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, coin_id: &str, latency: Duration, data_points: usize) {
        self.coin_latencies_ms
            .push((coin_id.to_string(), latency.as_millis() as u64));
        self.succeeded += 1;
        self.data_points += data_points;
    }

    pub fn record_failure(&mut self, coin_id: &str, latency: Duration) {
        self.coin_latencies_ms
            .push((coin_id.to_string(), latency.as_millis() as u64));
        self.failed += 1;
    }

    /// Set batch latency from a duration
    pub fn set_total_latency(&mut self, duration: Duration) {
        self.total_latency_ms = duration.as_millis() as u64;
    }

    /// Coins processed so far
    pub fn coins(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Fraction of coins that succeeded (0.0 for an empty batch)
    pub fn success_rate(&self) -> f64 {
        if self.coins() == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.coins() as f64
        }
    }

    /// Slowest single upstream call
    pub fn max_coin_latency_ms(&self) -> Option<u64> {
        self.coin_latencies_ms.iter().map(|(_, ms)| *ms).max()
    }

    /// Report metrics to tracing logs
    pub fn report(&self) {
        tracing::info!(
            "Batch market chart: coins={}, ok={}, failed={}, success_rate={:.2}, points={}, total={}ms, slowest_call={:?}ms",
            self.coins(),
            self.succeeded,
            self.failed,
            self.success_rate(),
            self.data_points,
            self.total_latency_ms,
            self.max_coin_latency_ms(),
        );
    }
}
