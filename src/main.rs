//! Stock price checker service
//!
//! Reports a price per ticker and tracks IP-deduplicated like counts
//! against a shared store. See lib.rs for the module map.

use stock_checker::infrastructure::api::{start_server, AppState};
use stock_checker::infrastructure::config::{Config, StoreBackend};
use stock_checker::infrastructure::logging::init_logging;
use stock_checker::likes::LikeCoordinator;
use stock_checker::lookup::QuoteClient;
use stock_checker::store::{MemoryTickerStore, PostgresTickerStore, TickerStore};
use stock_checker::{Result, StockError};

#[tokio::main]
async fn main() -> Result<()> {
    let _guards = init_logging();

    let config = Config::load().map_err(|e| StockError::Config(e.to_string()))?;

    tracing::info!("Starting stock checker service...");

    let quotes = QuoteClient::new(&config.lookup);

    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory ticker store");
            serve(MemoryTickerStore::new(), quotes, &config).await
        }
        StoreBackend::Postgres => {
            let store = PostgresTickerStore::connect(&config.store)?;
            store.init_schema().await?;
            tracing::info!("Connected to Postgres ticker store");
            serve(store, quotes, &config).await
        }
    }
}

/// Wire the shared state and run the server, monomorphized per store backend
async fn serve<S>(store: S, quotes: QuoteClient, config: &Config) -> Result<()>
where
    S: TickerStore + Clone + Send + Sync + 'static,
{
    let state = AppState {
        likes: LikeCoordinator::new(store.clone()),
        store,
        quotes,
    };
    start_server(state, &config.api).await
}
