//! Live USD prices for a set of ticker symbols

use crate::config::MarketDataConfig;
use crate::error::{MarketDataError, Result};
use crate::http::{build_client, endpoint, get_json};
use crate::models::PriceMap;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Price source used by the poller
///
/// Must accept an empty symbol list (returning an empty map) and lists of any length.
/// Symbols without a usable price are left out of the result.
#[async_trait]
pub trait PriceFetch: Send + Sync {
    async fn fetch(&self, symbols: &[String]) -> Result<PriceMap>;
}

/// Uppercase, trim, drop empties and deduplicate, keeping first-seen order
pub fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// CryptoCompare `/data/pricemulti` client
pub struct CryptoComparePrices {
    config: MarketDataConfig,
    client: Client,
}

impl CryptoComparePrices {
    /// Create a new price client
    pub fn new(config: MarketDataConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl PriceFetch for CryptoComparePrices {
    async fn fetch(&self, symbols: &[String]) -> Result<PriceMap> {
        let unique = normalize_symbols(symbols);
        if unique.is_empty() {
            return Ok(PriceMap::new());
        }

        let url = endpoint(&self.config.cryptocompare_base_url, &["data", "pricemulti"])?;
        let query = [("fsyms", unique.join(",")), ("tsyms", "USD".to_string())];

        let body = get_json(&self.client, url, &query).await?;
        parse_price_multi(&body)
    }
}

/// Decode a `pricemulti` body of the form `{"BTC": {"USD": 103000}, ...}`
///
/// Entries whose `USD` field is missing or not a finite number are skipped. An
/// `{"Response": "Error"}` body is reported as a provider error.
pub fn parse_price_multi(body: &Value) -> Result<PriceMap> {
    let object = body
        .as_object()
        .ok_or_else(|| MarketDataError::UnexpectedResponse("price body is not an object".to_string()))?;

    if object.get("Response").and_then(Value::as_str) == Some("Error") {
        let message = object
            .get("Message")
            .and_then(Value::as_str)
            .unwrap_or("unknown CryptoCompare error");
        return Err(MarketDataError::api(message));
    }

    let mut prices = PriceMap::new();
    for (symbol, entry) in object {
        match entry.get("USD").and_then(Value::as_f64) {
            Some(usd) if usd.is_finite() => {
                prices.insert(symbol.to_uppercase(), usd);
            }
            _ => debug!(symbol = %symbol, "Dropping price entry without numeric USD value"),
        }
    }

    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_symbols() {
        assert_eq!(
            normalize_symbols(&strings(&["btc", "ETH", " eth ", "", "Btc", "sol"])),
            strings(&["BTC", "ETH", "SOL"])
        );
        assert!(normalize_symbols(&[]).is_empty());
    }

    #[test]
    fn test_parse_drops_malformed_entries() {
        let prices = parse_price_multi(&json!({
            "BTC": {"USD": 103000.5},
            "ETH": {"USD": "3100"},
            "SOL": {},
            "DOGE": {"USD": 0.12}
        }))
        .unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices["BTC"], 103000.5);
        assert_eq!(prices["DOGE"], 0.12);
    }

    #[test]
    fn test_parse_error_body() {
        let err = parse_price_multi(&json!({
            "Response": "Error",
            "Message": "fsyms param is empty or null."
        }))
        .unwrap_err();

        assert!(matches!(err, MarketDataError::Api(msg) if msg.contains("fsyms")));
        assert!(parse_price_multi(&json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_empty_symbols_skip_the_request() {
        // Unroutable base URL: any request would fail
        let config = MarketDataConfig {
            cryptocompare_base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let prices = CryptoComparePrices::new(config).unwrap();

        let result = prices.fetch(&strings(&["", "  "])).await.unwrap();
        assert!(result.is_empty());
    }
}
