//! Cold path infrastructure
//!
//! Configuration loading, logging setup, and the HTTP API server.

pub mod api;
pub mod config;
pub mod logging;

pub use api::{start_server, AppState};
pub use config::Config;
pub use logging::init_logging;
