//! Ticker store abstraction
//!
//! The store is the single source of truth for like counts. It is injected
//! into the coordinator and the API so tests can substitute the in-memory
//! backend for Postgres. No dynamic dispatch: callers are generic over the
//! store and monomorphize.
//!
//! # Contract
//! - Records are created lazily and never deleted.
//! - `record_like_from_ip` is the only mutation of counters and must be
//!   atomic per symbol: concurrent calls with the same new IP land at most
//!   one increment, and the counter and IP set always move together.
//! - Failures surface as `StockError::Storage`; the store never retries.

use crate::core::TickerRecord;
use crate::Result;
use std::future::Future;

pub mod memory;
pub mod postgres;

pub use memory::MemoryTickerStore;
pub use postgres::PostgresTickerStore;

/// Persistent key-value table keyed by normalized ticker symbol
pub trait TickerStore: Send + Sync {
    /// Create a zero-like record for `symbol` if none exists.
    /// Idempotent; never resets an existing record.
    fn ensure_exists(&self, symbol: &str) -> impl Future<Output = Result<()>> + Send;

    /// Current like count for `symbol`, auto-creating the record on read
    fn like_count(&self, symbol: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Current counter and IP set for `symbol`, auto-creating on read
    fn record(&self, symbol: &str) -> impl Future<Output = Result<TickerRecord>> + Send;

    /// Atomic conditional increment: if `ip` is not yet recorded for
    /// `symbol`, increment the counter and append the IP in one step.
    /// Returns whether an increment landed.
    fn record_like_from_ip(
        &self,
        symbol: &str,
        ip: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Trivial connectivity round-trip for liveness probes
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}
