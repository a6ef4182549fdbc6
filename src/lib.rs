//! Stock price checker with IP-deduplicated like counts
//!
//! # Architecture
//! - **core**: Domain types (TickerRecord, symbol handling, StockQuery)
//! - **store**: Ticker store abstraction (memory and Postgres backends)
//! - **likes**: Like coordinator (at most one like per symbol/IP pair)
//! - **lookup**: External price-quote client
//! - **infrastructure**: Cold path (logging, config, HTTP API)

pub mod core;
pub mod infrastructure;
pub mod likes;
pub mod lookup;
pub mod store;

// Re-export commonly used types
pub use infrastructure::config::{ApiConfig, Config, LookupConfig, StoreConfig};

use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum StockError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("price lookup error: {0}")]
    Lookup(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StockError>;
