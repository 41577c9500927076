//! Market Data Clients
//!
//! Everything Coin Desk reads from third-party market APIs: the coin catalog and
//! coin details from CoinGecko, live multi-symbol prices from CryptoCompare.
//! The selection manager and the price poller only see the [`ItemCatalog`] and
//! [`PriceFetch`] traits, so they can be driven by fixtures in tests.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod details;
pub mod error;
pub mod http;
pub mod models;
pub mod more_info;
pub mod prices;

pub use cache::TtlCache;
pub use catalog::{CatalogIndex, CoinGeckoCatalog, ItemCatalog, StaticCatalog};
pub use config::MarketDataConfig;
pub use details::{CoinDetails, CoinDetailsService};
pub use error::{MarketDataError, Result};
pub use models::*;
pub use more_info::MoreInfoService;
pub use prices::{normalize_symbols, CryptoComparePrices, PriceFetch};
