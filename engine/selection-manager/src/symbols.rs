use market_data::CatalogIndex;
use std::collections::HashSet;
use tracing::debug;

/// Map selected ids to unique uppercase ticker symbols
///
/// Ids the catalog does not know are dropped; the result keeps selection order.
pub fn derive_symbols(selection: &[String], catalog: &CatalogIndex) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut symbols = Vec::with_capacity(selection.len());

    for id in selection {
        match catalog.symbol_for(id) {
            Some(symbol) => {
                if seen.insert(symbol.clone()) {
                    symbols.push(symbol);
                }
            }
            None => debug!(coin_id = %id, "No catalog entry for selected coin"),
        }
    }

    symbols
}
