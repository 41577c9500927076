use market_data::MarketDataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Coin {id} is not selected")]
    NotSelected { id: String },

    #[error("API key missing: set {var}")]
    MissingApiKey { var: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model returned an empty response")]
    EmptyCompletion,

    #[error("Unexpected completion response: {0}")]
    UnexpectedResponse(String),

    #[error("Coin data unavailable: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdvisorError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
