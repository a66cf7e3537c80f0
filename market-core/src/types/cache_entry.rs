use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::types::MarketData;

/// Cached `/coins/markets` listing.
///
/// Both fields are optional on the way in so that half-written or foreign
/// entries deserialize and can be rejected by [`CacheEntry::fresh_data`]
/// instead of failing the lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write time in epoch seconds
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub data: Option<Vec<MarketData>>,
}

impl CacheEntry {
    /// Build an entry stamped with the current time
    pub fn now(data: Vec<MarketData>) -> Self {
        Self {
            timestamp: Some(epoch_seconds()),
            data: Some(data),
        }
    }

    /// Decode a stored value; `None` when it does not have the entry shape
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "timestamp": self.timestamp,
            "data": self.data,
        })
    }

    /// Records of this entry if it is complete and younger than `ttl` at `now`
    /// (epoch seconds). A zero timestamp counts as missing.
    pub fn fresh_data(&self, ttl: Duration, now: f64) -> Option<&[MarketData]> {
        let timestamp = self.timestamp.filter(|ts| *ts > 0.0)?;
        let data = self.data.as_deref()?;

        if now - timestamp < ttl.as_secs_f64() {
            Some(data)
        } else {
            None
        }
    }

    /// Age of the entry in seconds at `now`, if it carries a timestamp
    pub fn age_secs(&self, now: f64) -> Option<f64> {
        self.timestamp.map(|ts| now - ts)
    }
}

/// Current wall-clock time in epoch seconds with sub-second precision
pub fn epoch_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
