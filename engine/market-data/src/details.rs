//! Coin market details used to build recommendation prompts

use crate::cache::TtlCache;
use crate::config::MarketDataConfig;
use crate::error::{MarketDataError, Result};
use crate::http::{build_client, endpoint, get_json};
use crate::models::AiCoinData;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

/// Source of [`AiCoinData`] for a coin id
#[async_trait]
pub trait CoinDetails: Send + Sync {
    async fn get_ai_coin_data(&self, coin_id: &str) -> Result<AiCoinData>;
}

/// Partial CoinGecko `/coins/{id}` response; only the consumed fields
#[derive(Debug, Deserialize, Default)]
struct CoinResponse {
    name: Option<String>,
    market_data: Option<MarketData>,
}

#[derive(Debug, Deserialize, Default)]
struct MarketData {
    current_price: Option<UsdValue>,
    market_cap: Option<UsdValue>,
    total_volume: Option<UsdValue>,
    price_change_percentage_30d_in_currency: Option<UsdValue>,
    price_change_percentage_60d_in_currency: Option<UsdValue>,
    price_change_percentage_200d_in_currency: Option<UsdValue>,
}

#[derive(Debug, Deserialize, Default)]
struct UsdValue {
    usd: Option<f64>,
}

fn usd(value: &Option<UsdValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.usd)
}

/// Decode a `/coins/{id}?market_data=true` body
///
/// Price, market cap and 24h volume are required; the change percentages are optional.
/// A missing name falls back to the coin id.
pub fn parse_ai_coin_data(coin_id: &str, body: serde_json::Value) -> Result<AiCoinData> {
    let response: CoinResponse = serde_json::from_value(body)?;
    let md = response.market_data.unwrap_or_default();

    let required = |value: Option<f64>, field: &str| {
        value.ok_or_else(|| MarketDataError::MissingField(format!("market_data.{field}.usd")))
    };

    Ok(AiCoinData {
        name: response.name.unwrap_or_else(|| coin_id.to_string()),
        current_price_usd: required(usd(&md.current_price), "current_price")?,
        market_cap_usd: required(usd(&md.market_cap), "market_cap")?,
        volume_24h_usd: required(usd(&md.total_volume), "total_volume")?,
        price_change_percentage_30d_in_currency: usd(&md.price_change_percentage_30d_in_currency),
        price_change_percentage_60d_in_currency: usd(&md.price_change_percentage_60d_in_currency),
        price_change_percentage_200d_in_currency: usd(&md.price_change_percentage_200d_in_currency),
    })
}

/// CoinGecko coin details with an in-memory TTL cache
pub struct CoinDetailsService {
    config: MarketDataConfig,
    client: Client,
    cache: TtlCache<AiCoinData>,
}

impl CoinDetailsService {
    pub fn new(config: MarketDataConfig) -> Result<Self> {
        let client = build_client(&config)?;
        let cache = TtlCache::new(config.detail_cache_ttl(), config.detail_cache_max_size);
        Ok(Self { config, client, cache })
    }

    /// Access the underlying cache
    pub fn cache(&self) -> &TtlCache<AiCoinData> {
        &self.cache
    }
}

#[async_trait]
impl CoinDetails for CoinDetailsService {
    async fn get_ai_coin_data(&self, coin_id: &str) -> Result<AiCoinData> {
        if let Some(data) = self.cache.get(coin_id).await {
            debug!(coin_id = coin_id, "Coin details served from cache");
            return Ok(data);
        }

        let url = endpoint(&self.config.coingecko_base_url, &["coins", coin_id])?;
        info!(coin_id = coin_id, "Fetching coin details");
        let body = get_json(&self.client, url, &[("market_data", "true".to_string())]).await?;

        let data = parse_ai_coin_data(coin_id, body)?;
        self.cache.insert(coin_id, data.clone()).await;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_response() {
        let data = parse_ai_coin_data(
            "bitcoin",
            json!({
                "name": "Bitcoin",
                "market_data": {
                    "current_price": {"usd": 65000.0, "eur": 60000.0},
                    "market_cap": {"usd": 1.28e12},
                    "total_volume": {"usd": 3.1e10},
                    "price_change_percentage_30d_in_currency": {"usd": 4.2},
                    "price_change_percentage_200d_in_currency": {"usd": -12.5}
                }
            }),
        )
        .unwrap();

        assert_eq!(data.name, "Bitcoin");
        assert_eq!(data.current_price_usd, 65000.0);
        assert_eq!(data.price_change_percentage_30d_in_currency, Some(4.2));
        assert_eq!(data.price_change_percentage_60d_in_currency, None);
        assert_eq!(data.price_change_percentage_200d_in_currency, Some(-12.5));
    }

    #[test]
    fn test_name_falls_back_to_id() {
        let data = parse_ai_coin_data(
            "mystery-coin",
            json!({
                "market_data": {
                    "current_price": {"usd": 1.0},
                    "market_cap": {"usd": 2.0},
                    "total_volume": {"usd": 3.0}
                }
            }),
        )
        .unwrap();
        assert_eq!(data.name, "mystery-coin");
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse_ai_coin_data(
            "bitcoin",
            json!({"name": "Bitcoin", "market_data": {"current_price": {"usd": 1.0}, "market_cap": {"usd": 2.0}}}),
        )
        .unwrap_err();
        assert!(matches!(err, MarketDataError::MissingField(f) if f.contains("total_volume")));

        assert!(parse_ai_coin_data("bitcoin", json!({})).is_err());
    }

    #[tokio::test]
    async fn test_cached_value_served_without_request() {
        let config = MarketDataConfig {
            coingecko_base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let service = CoinDetailsService::new(config).unwrap();
        let data = AiCoinData {
            name: "Ethereum".to_string(),
            current_price_usd: 3100.0,
            market_cap_usd: 3.7e11,
            volume_24h_usd: 1.5e10,
            price_change_percentage_30d_in_currency: None,
            price_change_percentage_60d_in_currency: None,
            price_change_percentage_200d_in_currency: None,
        };
        service.cache().insert("ethereum", data.clone()).await;

        assert_eq!(service.get_ai_coin_data("ethereum").await.unwrap(), data);
    }
}
