//! Service state management and component initialization

use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use advisor::{Advisor, ChatCompletionClient};
use market_data::{
    CatalogIndex, CoinDetails, CoinDetailsService, CoinGeckoCatalog, CryptoComparePrices,
    ItemCatalog, MoreInfoService, PriceFetch,
};
use persistence::{LocalPersistence, PersistedStore};
use price_poller::{PollEvent, PollerError, PollerHandle, PricePoller, SymbolSource};
use selection_manager::SelectionManager;

/// Service state containing all initialized components
pub struct ServiceState {
    /// Service configuration
    pub config: ServiceConfig,

    /// Backing store for the selection and the more-info cache
    pub store: Arc<dyn PersistedStore>,

    /// The pinned coins, shared with the poller's symbol source
    pub selection: Arc<RwLock<SelectionManager>>,

    pub catalog: Arc<dyn ItemCatalog>,
    pub prices: Arc<dyn PriceFetch>,
    pub details: Arc<dyn CoinDetails>,
    pub more_info: MoreInfoService,
}

impl ServiceState {
    /// Create a new service state backed by the configured data directory and live providers
    pub fn new(config: ServiceConfig) -> Result<Self> {
        info!("Initializing service components...");

        let store: Arc<dyn PersistedStore> = Arc::new(
            LocalPersistence::new(config.persistence()).context("Failed to open data directory")?,
        );

        let market = &config.market_data;
        let catalog: Arc<dyn ItemCatalog> =
            Arc::new(CoinGeckoCatalog::new(market.clone()).context("Failed to create catalog client")?);
        let prices: Arc<dyn PriceFetch> =
            Arc::new(CryptoComparePrices::new(market.clone()).context("Failed to create price client")?);
        let details: Arc<dyn CoinDetails> =
            Arc::new(CoinDetailsService::new(market.clone()).context("Failed to create details client")?);

        Self::with_components(config, store, catalog, prices, details)
    }

    /// Assemble the state from explicit collaborators
    pub fn with_components(
        config: ServiceConfig,
        store: Arc<dyn PersistedStore>,
        catalog: Arc<dyn ItemCatalog>,
        prices: Arc<dyn PriceFetch>,
        details: Arc<dyn CoinDetails>,
    ) -> Result<Self> {
        let manager = SelectionManager::hydrate(store.clone(), config.selection.clone())
            .context("Failed to load selection")?;
        let more_info = MoreInfoService::new(config.market_data.clone(), store.clone())
            .context("Failed to create more-info client")?;

        Ok(Self {
            config,
            store,
            selection: Arc::new(RwLock::new(manager)),
            catalog,
            prices,
            details,
            more_info,
        })
    }

    /// Fetch the catalog and hand it to the selection manager
    ///
    /// On failure the previous catalog stays in place; ids without a catalog entry
    /// are then left out of symbol-based views.
    pub async fn refresh_catalog(&self) -> Result<CatalogIndex> {
        let index = CatalogIndex::load(self.catalog.as_ref())
            .await
            .context("Failed to load coin catalog")?;
        info!("Catalog loaded with {} coins", index.len());
        self.selection.write().set_catalog(index.clone());
        Ok(index)
    }

    /// Like [`refresh_catalog`](Self::refresh_catalog) but only warns on failure
    pub async fn refresh_catalog_or_warn(&self) -> CatalogIndex {
        match self.refresh_catalog().await {
            Ok(index) => index,
            Err(e) => {
                warn!("Continuing without a coin catalog: {:#}", e);
                self.selection.read().catalog().clone()
            }
        }
    }

    /// Symbols of the live selection, read on every poll
    pub fn symbol_source(&self) -> Arc<dyn SymbolSource> {
        let selection = self.selection.clone();
        Arc::new(move || -> price_poller::Result<Vec<String>> {
            let manager = selection.read();
            if !manager.is_empty() && manager.catalog().is_empty() {
                return Err(PollerError::symbol_source("coin catalog not loaded"));
            }
            Ok(manager.symbols())
        })
    }

    /// Start the price poller over the current selection, already subscribed
    pub fn start_poller(&self) -> Result<(PollerHandle, broadcast::Receiver<PollEvent>)> {
        PricePoller::start_subscribed(self.symbol_source(), self.prices.clone(), self.config.poller.clone())
            .context("Failed to start price poller")
    }

    /// Build the recommendation advisor; needs an API key
    pub fn advisor(&self) -> Result<Advisor> {
        let completions = ChatCompletionClient::new(self.config.advisor.clone())
            .context("Failed to create completion client")?;
        Ok(Advisor::new(self.details.clone(), Arc::new(completions)))
    }
}
