//! Pure selection rules
//!
//! None of these functions touch storage or state. Selections are ordered id lists
//! without duplicates; the `*_raw` variants accept whatever was found in storage.

use market_data::CoinCard;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A selected coin offered as the eviction victim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceOption {
    pub id: String,
    pub symbol: String,
}

/// True iff another id fits
pub fn can_add(selection: &[String], max_size: usize) -> bool {
    selection.len() < max_size
}

/// Append `id` unless it is already present or the selection is full
pub fn add(selection: &[String], id: &str, max_size: usize) -> Vec<String> {
    let mut next = selection.to_vec();
    if !id.is_empty() && !contains(selection, id) && can_add(selection, max_size) {
        next.push(id.to_string());
    }
    next
}

/// Remove `id`, keeping the relative order of the rest
pub fn remove(selection: &[String], id: &str) -> Vec<String> {
    selection.iter().filter(|s| s.as_str() != id).cloned().collect()
}

/// Options for the replace decision, in selection order
///
/// Ids that no longer appear in `all_items` are dropped.
pub fn build_replace_options(all_items: &[CoinCard], selection: &[String]) -> Vec<ReplaceOption> {
    let by_id: HashMap<&str, &CoinCard> = all_items.iter().map(|c| (c.id.as_str(), c)).collect();

    selection
        .iter()
        .filter_map(|id| by_id.get(id.as_str()))
        .map(|card| ReplaceOption { id: card.id.clone(), symbol: card.symbol.clone() })
        .collect()
}

/// Remove `remove_id` (if present), append `add_id`, then cap at `max_size`
///
/// `add_id` is not appended when empty or already present, so the result never
/// holds duplicates.
pub fn replace(selection: &[String], remove_id: &str, add_id: &str, max_size: usize) -> Vec<String> {
    let mut next = remove(selection, remove_id);
    if !add_id.is_empty() && !contains(&next, add_id) {
        next.push(add_id.to_string());
    }
    next.truncate(max_size);
    next
}

/// [`can_add`] over an unvalidated stored value
///
/// Anything that is not a list is treated as "can add".
pub fn can_add_raw(selection: &Value, max_size: usize) -> bool {
    match selection.as_array() {
        Some(items) => items.len() < max_size,
        None => {
            warn!("Malformed selection value ({}), allowing add", type_name(selection));
            true
        }
    }
}

/// [`replace`] over an unvalidated stored value
///
/// Anything that is not a list yields `[add_id]`, or `[]` when `add_id` is empty.
pub fn replace_raw(selection: &Value, remove_id: &str, add_id: &str, max_size: usize) -> Vec<String> {
    match selection.as_array() {
        Some(_) => replace(&ids_from_value(selection), remove_id, add_id, max_size),
        None => {
            warn!("Malformed selection value ({}), replacing with single id", type_name(selection));
            if add_id.is_empty() {
                Vec::new()
            } else {
                vec![add_id.to_string()]
            }
        }
    }
}

/// String elements of a stored list; other elements are skipped
pub fn ids_from_value(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Drop empty ids and duplicates (first occurrence wins), then cap at `max_size`
pub fn sanitize(ids: Vec<String>, max_size: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut clean: Vec<String> =
        ids.into_iter().filter(|id| !id.is_empty() && seen.insert(id.clone())).collect();
    clean.truncate(max_size);
    clean
}

fn contains(selection: &[String], id: &str) -> bool {
    selection.iter().any(|s| s == id)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
