//! Pacing of upstream calls.
//!
//! The historical fetcher walks its coins one at a time and asks a [`Pacer`]
//! for permission before every upstream call, then reports back once the
//! call has completed. The pacer decides how long to hold the next call:
//! - [`FixedInterval`]: a fixed pause after each completed call
//! - [`TokenBucket`]: governor quota matching the provider's per-minute limit
//! - [`Unpaced`]: no waiting at all

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spacing used by the free CoinGecko tier between per-coin calls
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_millis(1500);

#[async_trait]
pub trait Pacer: Send + Sync {
    /// Resolve once the next upstream call may be issued
    async fn until_ready(&self);

    /// Record that the call released by `until_ready` has completed,
    /// successfully or not
    async fn finished(&self) {}
}

/// Pauses `interval` after each call completes before releasing the next.
///
/// The gap is measured from the later of the previous release and the
/// previous [`Pacer::finished`], so a slow upstream call still gets the full
/// pause after it. The first call goes out immediately, so nothing waits
/// after the last one.
pub struct FixedInterval {
    interval: Duration,
    last_activity: Mutex<Option<Instant>>,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_activity: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedInterval {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_INTERVAL)
    }
}

#[async_trait]
impl Pacer for FixedInterval {
    async fn until_ready(&self) {
        // Held across the sleep so concurrent batches queue behind each other
        let mut last = self.last_activity.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.interval).await;
        }
        *last = Some(Instant::now());
    }

    async fn finished(&self) {
        *self.last_activity.lock().await = Some(Instant::now());
    }
}

/// Token bucket over a per-minute quota
pub struct TokenBucket {
    limiter: DefaultDirectRateLimiter,
    requests_per_minute: u32,
}

impl TokenBucket {
    pub fn per_minute(requests_per_minute: u32) -> Result<Self> {
        let quota = NonZeroU32::new(requests_per_minute)
            .ok_or_else(|| anyhow!("requests_per_minute must be > 0"))?;

        Ok(Self {
            limiter: RateLimiter::direct(Quota::per_minute(quota)),
            requests_per_minute,
        })
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }
}

#[async_trait]
impl Pacer for TokenBucket {
    async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }
}

/// Never waits
pub struct Unpaced;

#[async_trait]
impl Pacer for Unpaced {
    async fn until_ready(&self) {}
}

/// Selects and builds a pacer from configuration
#[derive(Debug, Clone, PartialEq)]
pub enum PacingPolicy {
    Fixed(Duration),
    TokenBucket { requests_per_minute: u32 },
    Unpaced,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        PacingPolicy::Fixed(DEFAULT_PACING_INTERVAL)
    }
}

impl PacingPolicy {
    pub fn build(&self) -> Result<Arc<dyn Pacer>> {
        tracing::info!("Upstream pacing policy: {:?}", self);

        Ok(match self {
            PacingPolicy::Fixed(interval) => Arc::new(FixedInterval::new(*interval)),
            PacingPolicy::TokenBucket {
                requests_per_minute,
            } => Arc::new(TokenBucket::per_minute(*requests_per_minute)?),
            PacingPolicy::Unpaced => Arc::new(Unpaced),
        })
    }
}
