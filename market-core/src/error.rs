use thiserror::Error;

/// Upstream response bodies are cut to this many characters in error details
pub const DETAIL_MAX_CHARS: usize = 200;

/// Failures talking to the market-data provider.
///
/// Each variant maps to an HTTP-analogous status via [`UpstreamError::status`];
/// the display string is what callers get to see.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("Bad request to CoinGecko API (endpoint: {endpoint}). Error: {detail}")]
    BadRequest { endpoint: String, detail: String },

    #[error("Unauthorized by CoinGecko API (endpoint: {endpoint}). Check API key if used. Error: {detail}")]
    Unauthorized { endpoint: String, detail: String },

    #[error("Forbidden by CoinGecko API (endpoint: {endpoint}). May indicate WAF block or permission issue. Error: {detail}")]
    Forbidden { endpoint: String, detail: String },

    #[error("CoinGecko API endpoint '{endpoint}' not found. Error: {detail}")]
    NotFound { endpoint: String, detail: String },

    #[error("Rate limited by CoinGecko API (endpoint: {endpoint}). Try again later. Error: {detail}")]
    RateLimited { endpoint: String, detail: String },

    #[error("Error from CoinGecko API (endpoint: {endpoint}, status {status}): {detail}")]
    Upstream {
        endpoint: String,
        status: u16,
        detail: String,
    },

    #[error("Request to CoinGecko API timed out (endpoint: {endpoint}).")]
    Timeout { endpoint: String },

    #[error("Network error connecting to CoinGecko API (endpoint: {endpoint}): {message}")]
    Network { endpoint: String, message: String },

    #[error("Unexpected data structure received from CoinGecko: {0}")]
    Validation(String),

    #[error("Internal server error processing CoinGecko data: {0}")]
    Internal(String),
}

impl UpstreamError {
    /// Classify an HTTP error status (>= 400) returned by `endpoint`
    pub fn from_status(endpoint: &str, status: u16, body: &str) -> Self {
        let endpoint = endpoint.to_string();
        let detail = if body.trim().is_empty() {
            format!("HTTP {}", status)
        } else {
            truncate_detail(body)
        };

        match status {
            400 => UpstreamError::BadRequest { endpoint, detail },
            401 => UpstreamError::Unauthorized { endpoint, detail },
            403 => UpstreamError::Forbidden { endpoint, detail },
            404 => UpstreamError::NotFound { endpoint, detail },
            429 => UpstreamError::RateLimited { endpoint, detail },
            _ => UpstreamError::Upstream {
                endpoint,
                status,
                detail,
            },
        }
    }

    /// HTTP-analogous status code surfaced to callers
    pub fn status(&self) -> u16 {
        match self {
            UpstreamError::BadRequest { .. } => 400,
            UpstreamError::Unauthorized { .. } => 401,
            UpstreamError::Forbidden { .. } => 403,
            UpstreamError::NotFound { .. } => 404,
            UpstreamError::RateLimited { .. } => 429,
            UpstreamError::Upstream { status, .. } => *status,
            UpstreamError::Timeout { .. } => 408,
            UpstreamError::Network { .. } => 503,
            UpstreamError::Validation(_) => 502,
            UpstreamError::Internal(_) => 500,
        }
    }

    /// Truncated upstream body or transport message, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            UpstreamError::BadRequest { detail, .. }
            | UpstreamError::Unauthorized { detail, .. }
            | UpstreamError::Forbidden { detail, .. }
            | UpstreamError::NotFound { detail, .. }
            | UpstreamError::RateLimited { detail, .. }
            | UpstreamError::Upstream { detail, .. } => Some(detail),
            UpstreamError::Network { message, .. } => Some(message),
            UpstreamError::Validation(msg) | UpstreamError::Internal(msg) => Some(msg),
            UpstreamError::Timeout { .. } => None,
        }
    }
}

/// Cut `text` to at most [`DETAIL_MAX_CHARS`] characters on a char boundary
pub fn truncate_detail(text: &str) -> String {
    text.chars().take(DETAIL_MAX_CHARS).collect()
}
