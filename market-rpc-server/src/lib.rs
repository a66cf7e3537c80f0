pub mod config;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod server;

// Re-export commonly used items
pub use config::{CacheBackend, ServerConfig};
pub use error::RpcError;
pub use handler::MarketProxyHandler;
pub use server::RpcServer;
