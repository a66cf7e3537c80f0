use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Point-in-time market data for one asset, as listed by `/coins/markets`.
///
/// Only the identification fields are required. Every figure is optional:
/// CoinGecko omits or nulls them for thinly traded assets, and that is not
/// treated as an error. Unknown upstream fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    // ═══════════════════════════════════════════════════
    // IDENTIFICATION
    // ═══════════════════════════════════════════════════
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,

    // ═══════════════════════════════════════════════════
    // PRICE / CAP / VOLUME
    // ═══════════════════════════════════════════════════
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub total_volume: Option<f64>,

    // ═══════════════════════════════════════════════════
    // 24H WINDOW
    // ═══════════════════════════════════════════════════
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_change_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_change_percentage_24h: Option<f64>,

    // ═══════════════════════════════════════════════════
    // SUPPLY
    // ═══════════════════════════════════════════════════
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,

    // ═══════════════════════════════════════════════════
    // ALL-TIME HIGH / LOW
    // ═══════════════════════════════════════════════════
    #[serde(default)]
    pub ath: Option<f64>,
    #[serde(default)]
    pub ath_change_percentage: Option<f64>,
    #[serde(default)]
    pub ath_date: Option<String>,
    #[serde(default)]
    pub atl: Option<f64>,
    #[serde(default)]
    pub atl_change_percentage: Option<f64>,
    #[serde(default)]
    pub atl_date: Option<String>,

    #[serde(default)]
    pub roi: Option<Value>, // {times, currency, percentage} when present
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl MarketData {
    /// Create a record with only the identification fields set
    pub fn new(id: &str, symbol: &str, name: &str, image: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            image: image.to_string(),
            current_price: None,
            market_cap: None,
            market_cap_rank: None,
            total_volume: None,
            high_24h: None,
            low_24h: None,
            price_change_24h: None,
            price_change_percentage_24h: None,
            market_cap_change_24h: None,
            market_cap_change_percentage_24h: None,
            circulating_supply: None,
            total_supply: None,
            max_supply: None,
            ath: None,
            ath_change_percentage: None,
            ath_date: None,
            atl: None,
            atl_change_percentage: None,
            atl_date: None,
            roi: None,
            last_updated: None,
        }
    }
}

/// Quote currencies accepted by the snapshot endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VsCurrency {
    #[default]
    Usd,
    Eur,
    Sek,
}

impl VsCurrency {
    pub fn as_str(self) -> &'static str {
        match self {
            VsCurrency::Usd => "usd",
            VsCurrency::Eur => "eur",
            VsCurrency::Sek => "sek",
        }
    }
}

impl fmt::Display for VsCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VsCurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usd" => Ok(VsCurrency::Usd),
            "eur" => Ok(VsCurrency::Eur),
            "sek" => Ok(VsCurrency::Sek),
            other => Err(format!(
                "unsupported vs_currency '{}': expected one of usd, eur, sek",
                other
            )),
        }
    }
}

/// Where a snapshot response was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Cache,
}

/// Snapshot listing plus its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataResponse {
    pub data: Vec<MarketData>,
    pub source: DataSource,
}
