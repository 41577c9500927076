//! Error types for the price poller

use market_data::MarketDataError;
use thiserror::Error;

/// Errors that can occur in the price poller
#[derive(Error, Debug)]
pub enum PollerError {
    #[error("Price fetch failed: {0}")]
    Fetch(#[from] MarketDataError),

    #[error("Symbol source unavailable: {0}")]
    SymbolSource(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Poller must be started inside a Tokio runtime")]
    NoRuntime,
}

impl PollerError {
    pub fn symbol_source(msg: impl Into<String>) -> Self {
        Self::SymbolSource(msg.into())
    }
}

/// Result type for poller operations
pub type Result<T> = std::result::Result<T, PollerError>;
