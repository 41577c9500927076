//! "More info" lookups: a coin's price in USD, EUR and ILS
//!
//! Results are cached in the persisted store under `moreInfo_<coinId>` so they
//! survive restarts. Every failure degrades to `None`.

use crate::config::MarketDataConfig;
use crate::error::Result;
use crate::http::{build_client, endpoint, get_json};
use crate::models::CoinMoreInfo;
use chrono::{DateTime, Utc};
use persistence::{PersistedStore, PersistedStoreExt, StorageKeys};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct MoreInfoService {
    config: MarketDataConfig,
    client: Client,
    store: Arc<dyn PersistedStore>,
}

impl MoreInfoService {
    pub fn new(config: MarketDataConfig, store: Arc<dyn PersistedStore>) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client, store })
    }

    /// USD/EUR/ILS prices for a coin, from cache when fresh
    pub async fn get_more_info(&self, coin_id: &str) -> Option<CoinMoreInfo> {
        let now = Utc::now();
        if let Some(cached) = self.cached(coin_id, now) {
            debug!(coin_id = coin_id, "More info served from cache");
            return Some(cached);
        }

        match self.fetch(coin_id, now).await {
            Ok(Some(fresh)) => {
                if let Err(e) = self.store.write(&StorageKeys::more_info(coin_id), &fresh) {
                    warn!(coin_id = coin_id, error = %e, "Failed to cache more info");
                }
                Some(fresh)
            }
            Ok(None) => {
                debug!(coin_id = coin_id, "More info response lacks a required currency");
                None
            }
            Err(e) => {
                warn!(coin_id = coin_id, error = %e, "More info request failed");
                None
            }
        }
    }

    /// Cached entry for a coin if it is still fresh at `now`
    ///
    /// Unreadable cache entries are treated as absent.
    pub fn cached(&self, coin_id: &str, now: DateTime<Utc>) -> Option<CoinMoreInfo> {
        let ttl = chrono::Duration::from_std(self.config.detail_cache_ttl()).ok()?;
        let cached: Option<CoinMoreInfo> = self.store.read(&StorageKeys::more_info(coin_id), None);
        cached.filter(|info| info.is_fresh(now, ttl))
    }

    async fn fetch(&self, coin_id: &str, now: DateTime<Utc>) -> Result<Option<CoinMoreInfo>> {
        let url = endpoint(&self.config.coingecko_base_url, &["coins", coin_id])?;
        let body = get_json(&self.client, url, &[]).await?;
        Ok(parse_more_info(&body, now))
    }
}

/// Extract `market_data.current_price.{usd,eur,ils}`; all three must be numbers
pub fn parse_more_info(body: &Value, now: DateTime<Utc>) -> Option<CoinMoreInfo> {
    let prices = body.get("market_data")?.get("current_price")?;
    let price = |currency: &str| prices.get(currency).and_then(Value::as_f64);

    let stamp = now.timestamp_millis();
    Some(CoinMoreInfo {
        usd: price("usd")?,
        eur: price("eur")?,
        ils: price("ils")?,
        last_updated: stamp,
        timestamp: stamp,
    })
}
