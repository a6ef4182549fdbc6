//! Price quote lookup (cold path)
//!
//! Resolves a normalized symbol to its latest price through an external
//! quote proxy. Failures here are independent of the like/counter path:
//! no retries, and a failed lookup never rolls back a committed like.

use crate::infrastructure::config::LookupConfig;
use crate::StockError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Resolved quote for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct StockQuote {
    pub symbol: String,
    pub price: Decimal,
}

/// HTTP client for the external quote proxy
#[derive(Clone)]
pub struct QuoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl QuoteClient {
    pub fn new(config: &LookupConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent("stock-checker/0.1")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the latest price for `symbol`
    ///
    /// API: GET {base_url}/v1/stock/{symbol}/quote
    pub async fn fetch_price(&self, symbol: &str) -> Result<StockQuote, LookupError> {
        let url = format!("{}/v1/stock/{}/quote", self.base_url, symbol);

        tracing::debug!(%symbol, %url, "fetching quote");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LookupError::Http(response.status().as_u16()));
        }

        let quote: QuoteDto = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        Ok(StockQuote {
            symbol: quote.symbol,
            price: quote.latest_price,
        })
    }
}

/// Quote proxy response (extra fields ignored)
#[derive(Debug, Deserialize)]
struct QuoteDto {
    symbol: String,
    #[serde(rename = "latestPrice")]
    latest_price: Decimal,
}

/// Lookup errors
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<LookupError> for StockError {
    fn from(e: LookupError) -> Self {
        StockError::Lookup(e.to_string())
    }
}
