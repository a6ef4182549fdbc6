//! Per-symbol like record
//!
//! A record is created lazily on first reference to a symbol and never
//! deleted. `likes` always equals the size of `seen_ips`: the only mutation
//! is `register_ip`, which moves both together.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One row of the ticker store: symbol, like counter, and the set of
/// client IPs that have already liked it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    symbol: String,
    likes: u64,
    seen_ips: HashSet<String>,
}

impl TickerRecord {
    /// Fresh record with zero likes and an empty IP set
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            likes: 0,
            seen_ips: HashSet::new(),
        }
    }

    /// Rebuild a record from stored parts (e.g. a database row)
    pub fn from_parts(symbol: &str, likes: u64, seen_ips: Vec<String>) -> Self {
        Self {
            symbol: symbol.to_string(),
            likes,
            seen_ips: seen_ips.into_iter().collect(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn likes(&self) -> u64 {
        self.likes
    }

    pub fn seen_ips(&self) -> &HashSet<String> {
        &self.seen_ips
    }

    /// Conditional increment: count a like for `ip` unless it has already
    /// liked this symbol. Returns whether an increment landed.
    pub fn register_ip(&mut self, ip: &str) -> bool {
        if self.seen_ips.insert(ip.to_string()) {
            self.likes += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn test_new_record_is_empty() {
        let record = TickerRecord::new("GOOG");
        assert_eq!(record.symbol(), "GOOG");
        assert_eq!(record.likes(), 0);
        assert!(record.seen_ips().is_empty());
    }

    #[test]
    fn test_register_ip_counts_once() {
        let mut record = TickerRecord::new("GOOG");

        assert!(record.register_ip("1.2.3.4"));
        assert!(!record.register_ip("1.2.3.4"));
        assert!(!record.register_ip("1.2.3.4"));

        assert_eq!(record.likes(), 1);
        assert_eq!(record.seen_ips().len(), 1);
    }

    #[test]
    fn test_distinct_ips_accumulate() {
        let mut record = TickerRecord::new("MSFT");

        assert!(record.register_ip("1.2.3.4"));
        assert!(record.register_ip("5.6.7.8"));

        assert_eq!(record.likes(), 2);
        assert!(record.seen_ips().contains("1.2.3.4"));
        assert!(record.seen_ips().contains("5.6.7.8"));
    }

    #[test]
    fn test_from_parts_roundtrip() {
        let record = TickerRecord::from_parts(
            "AAPL",
            2,
            vec!["1.2.3.4".to_string(), "5.6.7.8".to_string()],
        );
        assert_eq!(record.likes(), 2);
        assert_eq!(record.seen_ips().len(), 2);
    }

    proptest! {
        /// likes == |seen_ips| holds for every record after any sequence of
        /// register_ip calls across symbols
        #[test]
        fn likes_always_match_ip_set(ops in prop::collection::vec((0usize..4, 0usize..6), 0..64)) {
            let symbols = ["GOOG", "MSFT", "AAPL", "TSLA"];
            let ips = ["1.1.1.1", "2.2.2.2", "3.3.3.3", "4.4.4.4", "5.5.5.5", "unknown"];

            let mut records: HashMap<&str, TickerRecord> = HashMap::new();
            for (s, i) in ops {
                let record = records
                    .entry(symbols[s])
                    .or_insert_with(|| TickerRecord::new(symbols[s]));
                record.register_ip(ips[i]);
            }

            for record in records.values() {
                prop_assert_eq!(record.likes(), record.seen_ips().len() as u64);
            }
        }
    }
}
