//! Symbol handling for the request boundary
//!
//! Symbols are validated and case-folded to uppercase before anything
//! touches the store, so "goog" and "GOOG" address the same record.
//! The one-vs-two stock query shape is resolved here once, not threaded
//! through the core as ambiguous types.

use crate::{Result, StockError};

/// Sentinel recorded when no client address can be determined.
/// All unknown-IP clients for a symbol collapse into a single counted like.
pub const UNKNOWN_IP: &str = "unknown";

/// Longest accepted ticker symbol (covers e.g. "BRK.B", "1000PEPE")
pub const MAX_SYMBOL_LEN: usize = 12;

/// Uppercase-normalize a raw symbol
pub fn normalize(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

/// Reject missing or malformed symbols before any store interaction
pub fn validate(symbol: &str) -> Result<()> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(StockError::Validation("missing stock symbol".to_string()));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(StockError::Validation(format!(
            "stock symbol too long: {}",
            symbol
        )));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(StockError::Validation(format!(
            "invalid stock symbol: {}",
            symbol
        )));
    }
    Ok(())
}

/// Query parameter shape resolved once at the request boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockQuery {
    One(String),
    Two(String, String),
}

impl StockQuery {
    /// Build a query from the raw repeated `stock` parameters.
    /// Each symbol is validated, then normalized.
    pub fn from_params(stocks: &[String]) -> Result<Self> {
        match stocks {
            [] => Err(StockError::Validation(
                "missing stock parameter".to_string(),
            )),
            [a] => {
                validate(a)?;
                Ok(StockQuery::One(normalize(a)))
            }
            [a, b] => {
                validate(a)?;
                validate(b)?;
                Ok(StockQuery::Two(normalize(a), normalize(b)))
            }
            _ => Err(StockError::Validation(
                "at most two stock symbols per request".to_string(),
            )),
        }
    }
}
