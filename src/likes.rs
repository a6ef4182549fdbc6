//! Like coordinator
//!
//! Implements "at most one like per (symbol, IP) pair" on top of the store's
//! atomic conditional increment. Every call guarantees the record exists,
//! even when no like was requested; repeated likes from the same IP are
//! ignored. Symbols are case-folded here before any store interaction.

use crate::core::symbol;
use crate::store::TickerStore;
use crate::Result;

/// Coordinates conditional like increments against the shared store
#[derive(Clone)]
pub struct LikeCoordinator<S> {
    store: S,
}

impl<S: TickerStore> LikeCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Ensure the record for `symbol` exists and, if a like was requested,
    /// count it unless `ip` has already liked this symbol.
    pub async fn record_like_from_ip(
        &self,
        symbol: &str,
        ip: &str,
        like_requested: bool,
    ) -> Result<()> {
        let symbol = symbol::normalize(symbol);

        // The record must exist after this call even when no like was asked
        self.store.ensure_exists(&symbol).await?;

        if !like_requested {
            return Ok(());
        }

        let counted = self.store.record_like_from_ip(&symbol, ip).await?;
        if counted {
            tracing::debug!(%symbol, %ip, "like recorded");
        } else {
            tracing::debug!(%symbol, %ip, "duplicate like ignored");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTickerStore;

    #[test]
    fn test_no_like_still_creates_record() {
        let store = MemoryTickerStore::new();
        let coordinator = LikeCoordinator::new(store.clone());

        tokio_test::block_on(coordinator.record_like_from_ip("GOOG", "1.2.3.4", false))
            .unwrap();

        let record = tokio_test::block_on(store.record("GOOG")).unwrap();
        assert_eq!(record.likes(), 0);
        assert!(record.seen_ips().is_empty());
    }

    #[test]
    fn test_like_normalizes_symbol_before_store() {
        let store = MemoryTickerStore::new();
        let coordinator = LikeCoordinator::new(store.clone());

        tokio_test::block_on(coordinator.record_like_from_ip("goog", "1.2.3.4", true))
            .unwrap();

        let count = tokio_test::block_on(store.like_count("GOOG")).unwrap();
        assert_eq!(count, 1);
    }
}
