//! Stateful selection with the replace-on-overflow protocol

use crate::config::SelectionConfig;
use crate::error::{Result, SelectionError};
use crate::events::{OverflowState, SelectionChange, SelectionEvent};
use crate::rules::{self, ReplaceOption};
use crate::symbols::derive_symbols;
use market_data::CatalogIndex;
use persistence::{PersistedStore, PersistedStoreExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owner of the selected coin ids
///
/// Every committed mutation is written through to the store before returning.
/// While a replacement decision is pending only [`confirm_replacement`] and
/// [`cancel_replacement`] are accepted.
///
/// [`confirm_replacement`]: SelectionManager::confirm_replacement
/// [`cancel_replacement`]: SelectionManager::cancel_replacement
pub struct SelectionManager {
    config: SelectionConfig,
    store: Arc<dyn PersistedStore>,
    selection: Vec<String>,
    state: OverflowState,
    catalog: CatalogIndex,
}

impl SelectionManager {
    /// Load the persisted selection
    ///
    /// Missing, corrupt or non-list data yields an empty selection. Duplicates and
    /// entries beyond `max_size` are dropped and the cleaned list is written back.
    pub fn hydrate(store: Arc<dyn PersistedStore>, config: SelectionConfig) -> Result<Self> {
        config.validate().map_err(SelectionError::Config)?;

        let stored = match store.read_value(&config.storage_key) {
            Ok(Some(value)) => value,
            Ok(None) => Value::Array(Vec::new()),
            Err(e) => {
                warn!(key = %config.storage_key, error = %e, "Stored selection is corrupt, starting empty");
                Value::Array(Vec::new())
            }
        };

        if !stored.is_array() {
            warn!(key = %config.storage_key, "Stored selection is not a list, starting empty");
        }

        let raw_ids = rules::ids_from_value(&stored);
        let raw_len = stored.as_array().map_or(0, Vec::len);
        let selection = rules::sanitize(raw_ids, config.max_size);

        let mut manager = Self {
            config,
            store,
            selection,
            state: OverflowState::Idle,
            catalog: CatalogIndex::default(),
        };

        if manager.selection.len() != raw_len || !stored.is_array() {
            warn!(
                kept = manager.selection.len(),
                found = raw_len,
                "Stored selection needed cleanup, rewriting"
            );
            manager.persist();
        }

        info!("Selection hydrated with {} coins", manager.selection.len());
        Ok(manager)
    }

    /// Replace the catalog used for replace options and symbol derivation
    pub fn set_catalog(&mut self, catalog: CatalogIndex) {
        self.catalog = catalog;
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Current selection, in insertion order
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn can_add(&self) -> bool {
        rules::can_add(&self.selection, self.config.max_size)
    }

    pub fn state(&self) -> &OverflowState {
        &self.state
    }

    /// Id awaiting a replacement decision
    pub fn pending(&self) -> Option<&str> {
        self.state.pending()
    }

    /// Uppercase symbol of the pending coin, or its id when the catalog lacks it
    pub fn pending_symbol(&self) -> Option<String> {
        self.pending()
            .map(|id| self.catalog.symbol_for(id).unwrap_or_else(|| id.to_uppercase()))
    }

    /// Eviction candidates for the decision surface
    pub fn replace_options(&self) -> Vec<ReplaceOption> {
        rules::build_replace_options(self.catalog.cards(), &self.selection)
    }

    /// Unique uppercase ticker symbols of the selection
    pub fn symbols(&self) -> Vec<String> {
        derive_symbols(&self.selection, &self.catalog)
    }

    /// Add a coin, or open a replacement decision when the selection is full
    pub fn request_add(&mut self, id: &str) -> Result<SelectionChange> {
        self.ensure_idle()?;
        if id.is_empty() {
            return Err(SelectionError::EmptyId);
        }

        if self.contains(id) {
            debug!(coin_id = id, "Coin already selected");
            return Ok(SelectionChange::Unchanged);
        }

        if !self.can_add() {
            info!(coin_id = id, "Selection full, awaiting replacement decision");
            self.state = OverflowState::AwaitingReplacement { pending: id.to_string() };
            return Ok(SelectionChange::AwaitingReplacement {
                pending: id.to_string(),
                options: self.replace_options(),
            });
        }

        self.commit(rules::add(&self.selection, id, self.config.max_size));
        info!(coin_id = id, "Coin added to selection");
        Ok(SelectionChange::Applied(SelectionEvent::Added { id: id.to_string() }))
    }

    /// Remove a coin; absent ids are a no-op
    pub fn remove(&mut self, id: &str) -> Result<SelectionChange> {
        self.ensure_idle()?;

        if !self.contains(id) {
            return Ok(SelectionChange::Unchanged);
        }

        self.commit(rules::remove(&self.selection, id));
        info!(coin_id = id, "Coin removed from selection");
        Ok(SelectionChange::Applied(SelectionEvent::Removed { id: id.to_string() }))
    }

    /// Checkbox semantics: checked adds, unchecked removes
    pub fn toggle(&mut self, id: &str, checked: bool) -> Result<SelectionChange> {
        if checked {
            self.request_add(id)
        } else {
            self.remove(id)
        }
    }

    /// Evict `victim` in favour of the pending coin
    ///
    /// An unknown victim is rejected and the decision stays open.
    pub fn confirm_replacement(&mut self, victim: &str) -> Result<SelectionEvent> {
        let pending = self.pending().ok_or(SelectionError::NoPendingAddition)?.to_string();

        if !self.contains(victim) {
            return Err(SelectionError::NotSelected { id: victim.to_string() });
        }

        self.commit(rules::replace(&self.selection, victim, &pending, self.config.max_size));
        self.state = OverflowState::Idle;

        info!(removed = victim, added = %pending, "Replaced selected coin");
        Ok(SelectionEvent::Replaced { removed: victim.to_string(), added: pending })
    }

    /// Drop the pending coin, leaving the selection as it was
    pub fn cancel_replacement(&mut self) -> Result<String> {
        match std::mem::take(&mut self.state) {
            OverflowState::AwaitingReplacement { pending } => {
                debug!(coin_id = %pending, "Replacement cancelled");
                Ok(pending)
            }
            OverflowState::Idle => Err(SelectionError::NoPendingAddition),
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.pending() {
            Some(pending) => Err(SelectionError::DecisionPending { pending: pending.to_string() }),
            None => Ok(()),
        }
    }

    fn commit(&mut self, next: Vec<String>) {
        self.selection = next;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.store.write(&self.config.storage_key, &self.selection) {
            warn!(key = %self.config.storage_key, error = %e, "Failed to persist selection");
        }
    }
}
