//! Domain types for the stock price checker
//!
//! - TickerRecord: per-symbol like counter plus the IPs that produced it
//! - Symbol normalization/validation and the one-vs-two stock query shape

pub mod record;
pub mod symbol;

pub use record::TickerRecord;
pub use symbol::{normalize, validate, StockQuery, UNKNOWN_IP};
