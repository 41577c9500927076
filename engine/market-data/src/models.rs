use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Symbol → USD price mapping returned by a price fetch
pub type PriceMap = BTreeMap<String, f64>;

/// One coin as listed by the market catalog
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CoinCard {
    pub id: String,

    /// Provider symbol, usually lowercase (e.g. "btc")
    pub symbol: String,

    pub name: String,

    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default)]
    pub market_cap: Option<f64>,

    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl CoinCard {
    /// Minimal card, used when only id and symbol matter
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            image: String::new(),
            current_price: None,
            market_cap: None,
            price_change_percentage_24h: None,
        }
    }

    /// Ticker symbol in the uppercase form used for price lookups
    pub fn ticker(&self) -> String {
        self.symbol.to_uppercase()
    }
}

/// USD/EUR/ILS prices shown in a coin's "more info" panel
///
/// Stored as JSON under `moreInfo_<coinId>`; `timestamp` is the fetch time in epoch
/// milliseconds and drives cache expiry.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoinMoreInfo {
    pub usd: f64,
    pub eur: f64,
    pub ils: f64,
    pub last_updated: i64,
    pub timestamp: i64,
}

impl CoinMoreInfo {
    /// Whether the entry is younger than `ttl` at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now.timestamp_millis() - self.timestamp < ttl.num_milliseconds()
    }
}

/// Market data handed to the recommendation prompt
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AiCoinData {
    pub name: String,
    pub current_price_usd: f64,
    pub market_cap_usd: f64,
    pub volume_24h_usd: f64,
    pub price_change_percentage_30d_in_currency: Option<f64>,
    pub price_change_percentage_60d_in_currency: Option<f64>,
    pub price_change_percentage_200d_in_currency: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coin_card_tolerates_missing_optional_fields() {
        let card: CoinCard = serde_json::from_value(json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "current_price": null
        }))
        .unwrap();

        assert_eq!(card.ticker(), "BTC");
        assert_eq!(card.current_price, None);
        assert!(card.image.is_empty());
    }

    #[test]
    fn test_more_info_storage_shape() {
        let info = CoinMoreInfo { usd: 1.0, eur: 0.9, ils: 3.7, last_updated: 10, timestamp: 10 };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["lastUpdated"], json!(10));
        assert_eq!(value["timestamp"], json!(10));
    }

    #[test]
    fn test_more_info_freshness() {
        let fetched = Utc::now();
        let info = CoinMoreInfo {
            usd: 1.0,
            eur: 1.0,
            ils: 1.0,
            last_updated: fetched.timestamp_millis(),
            timestamp: fetched.timestamp_millis(),
        };
        let ttl = chrono::Duration::seconds(120);

        assert!(info.is_fresh(fetched + chrono::Duration::seconds(119), ttl));
        assert!(!info.is_fresh(fetched + chrono::Duration::seconds(120), ttl));
    }
}
