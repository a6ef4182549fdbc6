//! In-memory ticker store
//!
//! Default dev backend and the fake used by tests. The whole table sits
//! behind one parking_lot mutex; the conditional increment runs entirely
//! under a single guard, so the read-check-write of `record_like_from_ip`
//! cannot interleave. The guard is never held across an await point.

use crate::core::TickerRecord;
use crate::store::TickerStore;
use crate::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared in-memory table of ticker records
#[derive(Clone, Default)]
pub struct MemoryTickerStore {
    records: Arc<Mutex<HashMap<String, TickerRecord>>>,
}

impl MemoryTickerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickerStore for MemoryTickerStore {
    async fn ensure_exists(&self, symbol: &str) -> Result<()> {
        let mut records = self.records.lock();
        records
            .entry(symbol.to_string())
            .or_insert_with(|| TickerRecord::new(symbol));
        Ok(())
    }

    async fn like_count(&self, symbol: &str) -> Result<u64> {
        let mut records = self.records.lock();
        let record = records
            .entry(symbol.to_string())
            .or_insert_with(|| TickerRecord::new(symbol));
        Ok(record.likes())
    }

    async fn record(&self, symbol: &str) -> Result<TickerRecord> {
        let mut records = self.records.lock();
        let record = records
            .entry(symbol.to_string())
            .or_insert_with(|| TickerRecord::new(symbol));
        Ok(record.clone())
    }

    async fn record_like_from_ip(&self, symbol: &str, ip: &str) -> Result<bool> {
        let mut records = self.records.lock();
        let record = records
            .entry(symbol.to_string())
            .or_insert_with(|| TickerRecord::new(symbol));
        Ok(record.register_ip(ip))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_create_on_read() {
        let store = MemoryTickerStore::new();
        let count = tokio_test::block_on(store.like_count("GOOG")).unwrap();
        assert_eq!(count, 0);

        let record = tokio_test::block_on(store.record("GOOG")).unwrap();
        assert_eq!(record.symbol(), "GOOG");
        assert!(record.seen_ips().is_empty());
    }

    #[test]
    fn test_ensure_exists_does_not_reset() {
        let store = MemoryTickerStore::new();

        assert!(tokio_test::block_on(store.record_like_from_ip("GOOG", "1.2.3.4")).unwrap());
        tokio_test::block_on(store.ensure_exists("GOOG")).unwrap();

        let count = tokio_test::block_on(store.like_count("GOOG")).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_conditional_increment() {
        let store = MemoryTickerStore::new();

        assert!(tokio_test::block_on(store.record_like_from_ip("GOOG", "1.2.3.4")).unwrap());
        assert!(!tokio_test::block_on(store.record_like_from_ip("GOOG", "1.2.3.4")).unwrap());
        assert!(tokio_test::block_on(store.record_like_from_ip("GOOG", "5.6.7.8")).unwrap());

        let record = tokio_test::block_on(store.record("GOOG")).unwrap();
        assert_eq!(record.likes(), 2);
        assert_eq!(record.seen_ips().len(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryTickerStore::new();
        let other = store.clone();

        tokio_test::block_on(store.record_like_from_ip("GOOG", "1.2.3.4")).unwrap();
        let count = tokio_test::block_on(other.like_count("GOOG")).unwrap();
        assert_eq!(count, 1);
    }
}
