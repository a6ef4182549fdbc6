//! Postgres ticker store
//!
//! Production backend; safe for multiple service instances because the
//! conditional increment is a single UPDATE statement. Row-level locking of
//! that UPDATE serializes concurrent likes on the same symbol, and the
//! counter and IP array change in the same statement or not at all.
//!
//! The synchronous driver is kept behind `spawn_blocking`; no connection is
//! held across an external network call.

use crate::core::TickerRecord;
use crate::infrastructure::config::StoreConfig;
use crate::store::TickerStore;
use crate::{Result, StockError};
use postgres::NoTls;
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use std::time::Duration;
use tokio::task;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS tickers (
    symbol   TEXT PRIMARY KEY,
    likes    BIGINT NOT NULL DEFAULT 0,
    seen_ips TEXT[] NOT NULL DEFAULT '{}'
)";

const ENSURE_SQL: &str =
    "INSERT INTO tickers (symbol) VALUES ($1) ON CONFLICT (symbol) DO NOTHING";

const RECORD_SQL: &str = "SELECT likes, seen_ips FROM tickers WHERE symbol = $1";

/// Atomic append-if-absent + increment. Affects one row when the IP is new,
/// zero rows when it has already liked the symbol.
const LIKE_SQL: &str = "UPDATE tickers
     SET likes = likes + 1, seen_ips = array_append(seen_ips, $2)
     WHERE symbol = $1 AND NOT ($2 = ANY(seen_ips))";

/// Pooled Postgres-backed ticker store
#[derive(Clone)]
pub struct PostgresTickerStore {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresTickerStore {
    /// Build the connection pool. Blocks while the initial connections are
    /// established, so call at startup.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let pg_config: postgres::Config = config
            .url
            .parse()
            .map_err(|e: postgres::Error| StockError::Storage(e.to_string()))?;

        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build(manager)
            .map_err(|e| StockError::Storage(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Create the tickers table if it is missing
    pub async fn init_schema(&self) -> Result<()> {
        self.run(|conn| {
            conn.batch_execute(SCHEMA_SQL).map_err(storage)?;
            Ok(())
        })
        .await
    }

    /// Run a blocking driver operation on the blocking pool
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut postgres::Client) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| StockError::Storage(e.to_string()))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| StockError::Storage(e.to_string()))?
    }
}

impl TickerStore for PostgresTickerStore {
    async fn ensure_exists(&self, symbol: &str) -> Result<()> {
        let symbol = symbol.to_string();
        self.run(move |conn| {
            conn.execute(ENSURE_SQL, &[&symbol]).map_err(storage)?;
            Ok(())
        })
        .await
    }

    async fn like_count(&self, symbol: &str) -> Result<u64> {
        let symbol = symbol.to_string();
        self.run(move |conn| {
            conn.execute(ENSURE_SQL, &[&symbol]).map_err(storage)?;
            let row = conn.query_one(RECORD_SQL, &[&symbol]).map_err(storage)?;
            let likes: i64 = row.get(0);
            Ok(likes as u64)
        })
        .await
    }

    async fn record(&self, symbol: &str) -> Result<TickerRecord> {
        let symbol = symbol.to_string();
        self.run(move |conn| {
            conn.execute(ENSURE_SQL, &[&symbol]).map_err(storage)?;
            let row = conn.query_one(RECORD_SQL, &[&symbol]).map_err(storage)?;
            let likes: i64 = row.get(0);
            let seen_ips: Vec<String> = row.get(1);
            Ok(TickerRecord::from_parts(&symbol, likes as u64, seen_ips))
        })
        .await
    }

    async fn record_like_from_ip(&self, symbol: &str, ip: &str) -> Result<bool> {
        let symbol = symbol.to_string();
        let ip = ip.to_string();
        self.run(move |conn| {
            conn.execute(ENSURE_SQL, &[&symbol]).map_err(storage)?;
            let updated = conn.execute(LIKE_SQL, &[&symbol, &ip]).map_err(storage)?;
            Ok(updated == 1)
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.run(|conn| {
            conn.query_one("SELECT 1", &[]).map_err(storage)?;
            Ok(())
        })
        .await
    }
}

fn storage(e: postgres::Error) -> StockError {
    StockError::Storage(e.to_string())
}
