use market_core::UpstreamError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("{0}")]
    Upstream(#[from] UpstreamError),
}

impl RpcError {
    /// Get the JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        use crate::protocol::*;
        match self {
            RpcError::ParseError(_) => PARSE_ERROR,
            RpcError::InvalidRequest(_) => INVALID_REQUEST,
            RpcError::MethodNotFound(_) => METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => INVALID_PARAMS,
            RpcError::InternalError(_) => INTERNAL_ERROR,
            RpcError::Upstream(_) => UPSTREAM_ERROR,
        }
    }

    /// HTTP-analogous status for this error
    pub fn http_status(&self) -> u16 {
        match self {
            RpcError::ParseError(_) | RpcError::InvalidRequest(_) => 400,
            RpcError::MethodNotFound(_) => 404,
            RpcError::InvalidParams(_) => 422,
            RpcError::InternalError(_) => 500,
            RpcError::Upstream(e) => e.status(),
        }
    }

    /// Get additional error data (optional)
    pub fn data(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({ "status": self.http_status() }))
    }
}
