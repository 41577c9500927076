use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the market data clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// CoinGecko API base URL (catalog and coin details)
    pub coingecko_base_url: String,

    /// CryptoCompare API base URL (live prices)
    pub cryptocompare_base_url: String,

    /// Quote currency for the catalog listing
    pub vs_currency: String,

    /// Number of coins requested for the catalog page
    pub catalog_page_size: u32,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// How long coin details stay fresh in the caches (seconds)
    pub detail_cache_ttl_secs: u64,

    /// Maximum number of entries kept by the in-memory detail cache
    pub detail_cache_max_size: usize,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            cryptocompare_base_url: "https://min-api.cryptocompare.com".to_string(),
            vs_currency: "usd".to_string(),
            catalog_page_size: 100,
            request_timeout_secs: 15,
            detail_cache_ttl_secs: 120,
            detail_cache_max_size: 256,
        }
    }
}

impl MarketDataConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override provider URLs and the request timeout from the environment
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("COINGECKO_BASE_URL") {
            self.coingecko_base_url = url;
        }

        if let Ok(url) = std::env::var("CRYPTOCOMPARE_BASE_URL") {
            self.cryptocompare_base_url = url;
        }

        if let Ok(timeout) = std::env::var("MARKET_DATA_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.request_timeout_secs = secs;
            }
        }
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get detail cache TTL as Duration
    pub fn detail_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_cache_ttl_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in [
            ("coingecko_base_url", &self.coingecko_base_url),
            ("cryptocompare_base_url", &self.cryptocompare_base_url),
        ] {
            if url::Url::parse(url).is_err() {
                return Err(format!("{name} is not a valid URL: {url}"));
            }
        }

        if self.catalog_page_size == 0 || self.catalog_page_size > 250 {
            return Err("catalog_page_size must be between 1 and 250".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }

        if self.detail_cache_max_size == 0 {
            return Err("detail_cache_max_size must be greater than 0".to_string());
        }

        Ok(())
    }
}
