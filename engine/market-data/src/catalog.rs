//! Coin catalog: the list of coins a user can pick from

use crate::config::MarketDataConfig;
use crate::error::{MarketDataError, Result};
use crate::http::{build_client, endpoint, get_json};
use crate::models::CoinCard;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use tracing::{debug, info};

/// Source of the full coin listing
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Fetch every coin the catalog offers, in provider order
    async fn fetch_all(&self) -> Result<Vec<CoinCard>>;
}

/// CoinGecko `/coins/markets` catalog, ordered by market cap
pub struct CoinGeckoCatalog {
    config: MarketDataConfig,
    client: Client,
}

impl CoinGeckoCatalog {
    /// Create a new catalog client
    pub fn new(config: MarketDataConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ItemCatalog for CoinGeckoCatalog {
    async fn fetch_all(&self) -> Result<Vec<CoinCard>> {
        let url = endpoint(&self.config.coingecko_base_url, &["coins", "markets"])?;
        let query = [
            ("vs_currency", self.config.vs_currency.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", self.config.catalog_page_size.to_string()),
            ("page", "1".to_string()),
        ];

        info!("Fetching coin catalog ({} coins)", self.config.catalog_page_size);
        let body = get_json(&self.client, url, &query).await?;
        let cards = parse_catalog(body)?;

        info!("Successfully fetched {} coins", cards.len());
        Ok(cards)
    }
}

/// Decode a `/coins/markets` body
pub fn parse_catalog(body: serde_json::Value) -> Result<Vec<CoinCard>> {
    if !body.is_array() {
        return Err(MarketDataError::UnexpectedResponse("catalog body is not a list".to_string()));
    }
    Ok(serde_json::from_value(body)?)
}

/// Fixed catalog backed by a list of cards
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    cards: Vec<CoinCard>,
}

impl StaticCatalog {
    pub fn new(cards: Vec<CoinCard>) -> Self {
        Self { cards }
    }
}

#[async_trait]
impl ItemCatalog for StaticCatalog {
    async fn fetch_all(&self) -> Result<Vec<CoinCard>> {
        Ok(self.cards.clone())
    }
}

/// Lookup structure over a fetched catalog
///
/// Keeps provider order for listing and an id index for the id → symbol mapping.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    cards: Vec<CoinCard>,
    by_id: HashMap<String, usize>,
}

impl CatalogIndex {
    /// Build an index; later duplicates of an id are ignored
    pub fn new(cards: Vec<CoinCard>) -> Self {
        let mut by_id = HashMap::with_capacity(cards.len());
        let mut kept = Vec::with_capacity(cards.len());

        for card in cards {
            if by_id.contains_key(&card.id) {
                debug!(coin_id = %card.id, "Skipping duplicate catalog entry");
                continue;
            }
            by_id.insert(card.id.clone(), kept.len());
            kept.push(card);
        }

        Self { cards: kept, by_id }
    }

    /// Fetch the catalog and index it
    pub async fn load(catalog: &dyn ItemCatalog) -> Result<Self> {
        Ok(Self::new(catalog.fetch_all().await?))
    }

    pub fn cards(&self) -> &[CoinCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card for a coin id
    pub fn get(&self, coin_id: &str) -> Option<&CoinCard> {
        self.by_id.get(coin_id).map(|&i| &self.cards[i])
    }

    /// Uppercase ticker symbol for a coin id
    pub fn symbol_for(&self, coin_id: &str) -> Option<String> {
        self.get(coin_id).map(CoinCard::ticker)
    }

    /// Case-insensitive substring search over name and symbol
    ///
    /// An empty (or all-whitespace) query matches every card.
    pub fn search(&self, query: &str) -> Vec<&CoinCard> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.cards.iter().collect();
        }

        self.cards
            .iter()
            .filter(|card| {
                card.name.to_lowercase().contains(&needle)
                    || card.symbol.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
