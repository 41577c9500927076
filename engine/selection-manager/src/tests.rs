//! Scenario and property tests for the selection manager

use std::sync::Arc;

use market_data::{CatalogIndex, CoinCard};
use persistence::{InMemoryPersistence, PersistedStoreExt};

use crate::events::{COIN_ADDED_NOTICE, COIN_REMOVED_NOTICE};
use crate::{
    rules, OverflowState, ReplaceOption, SelectionChange, SelectionConfig, SelectionEvent,
    SelectionManager,
};

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn create_test_catalog() -> CatalogIndex {
    CatalogIndex::new(vec![
        CoinCard::new("a", "aaa", "Coin A"),
        CoinCard::new("b", "bbb", "Coin B"),
        CoinCard::new("c", "ccc", "Coin C"),
        CoinCard::new("d", "ddd", "Coin D"),
        CoinCard::new("e", "eee", "Coin E"),
        CoinCard::new("f", "fff", "Coin F"),
    ])
}

fn create_test_manager(initial: &[&str]) -> (Arc<InMemoryPersistence>, SelectionManager) {
    let store = Arc::new(InMemoryPersistence::default());
    store.write("selectedCoinIds", &ids(initial)).unwrap();

    let mut manager = SelectionManager::hydrate(store.clone(), SelectionConfig::default()).unwrap();
    manager.set_catalog(create_test_catalog());
    (store, manager)
}

fn persisted(store: &InMemoryPersistence) -> Vec<String> {
    store.read("selectedCoinIds", Vec::new())
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_first_add_is_persisted() {
        let (store, mut manager) = create_test_manager(&[]);

        let change = manager.request_add("btc").unwrap();

        assert_eq!(change, SelectionChange::Applied(SelectionEvent::Added { id: "btc".to_string() }));
        assert_eq!(manager.selection(), ["btc"]);
        assert_eq!(persisted(&store), vec!["btc"]);
    }

    #[test]
    fn test_overflow_then_confirm() {
        let (store, mut manager) = create_test_manager(&["a", "b", "c", "d", "e"]);

        let change = manager.request_add("f").unwrap();
        match change {
            SelectionChange::AwaitingReplacement { pending, options } => {
                assert_eq!(pending, "f");
                assert_eq!(options.len(), 5);
                assert_eq!(options[0], ReplaceOption { id: "a".to_string(), symbol: "aaa".to_string() });
            }
            other => panic!("Expected AwaitingReplacement, got {other:?}"),
        }
        assert_eq!(manager.state(), &OverflowState::AwaitingReplacement { pending: "f".to_string() });
        assert_eq!(manager.pending_symbol(), Some("FFF".to_string()));
        assert_eq!(manager.selection(), ["a", "b", "c", "d", "e"]);

        let event = manager.confirm_replacement("b").unwrap();

        assert_eq!(event, SelectionEvent::Replaced { removed: "b".to_string(), added: "f".to_string() });
        assert_eq!(event.notices(), vec![COIN_REMOVED_NOTICE, COIN_ADDED_NOTICE]);
        assert_eq!(manager.selection(), ["a", "c", "d", "e", "f"]);
        assert_eq!(manager.state(), &OverflowState::Idle);
        assert_eq!(persisted(&store), vec!["a", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_overflow_then_cancel() {
        let (store, mut manager) = create_test_manager(&["a", "b", "c", "d", "e"]);
        let writes_before = store.write_count();

        manager.request_add("f").unwrap();
        assert_eq!(manager.cancel_replacement().unwrap(), "f");

        assert_eq!(manager.state(), &OverflowState::Idle);
        assert_eq!(manager.selection(), ["a", "b", "c", "d", "e"]);
        assert_eq!(store.write_count(), writes_before);

        // Back to normal operation
        assert!(matches!(manager.remove("a").unwrap(), SelectionChange::Applied(_)));
    }

    #[test]
    fn test_pending_symbol_falls_back_to_id() {
        let (_, mut manager) = create_test_manager(&["a", "b", "c", "d", "e"]);
        manager.request_add("not-in-catalog").unwrap();
        assert_eq!(manager.pending_symbol(), Some("NOT-IN-CATALOG".to_string()));
    }

    #[test]
    fn test_toggle() {
        let (_, mut manager) = create_test_manager(&["a"]);

        assert_eq!(
            manager.toggle("b", true).unwrap(),
            SelectionChange::Applied(SelectionEvent::Added { id: "b".to_string() })
        );
        assert_eq!(manager.toggle("b", true).unwrap(), SelectionChange::Unchanged);
        assert_eq!(
            manager.toggle("a", false).unwrap(),
            SelectionChange::Applied(SelectionEvent::Removed { id: "a".to_string() })
        );
        assert_eq!(manager.toggle("a", false).unwrap(), SelectionChange::Unchanged);
        assert_eq!(manager.selection(), ["b"]);
    }

    #[test]
    fn test_symbols_follow_selection() {
        let (_, mut manager) = create_test_manager(&["c", "stale", "a"]);
        assert_eq!(manager.symbols(), ids(&["CCC", "AAA"]));

        manager.remove("c").unwrap();
        assert_eq!(manager.symbols(), ids(&["AAA"]));
    }

    #[test]
    fn test_replace_options_skip_stale_ids() {
        let (_, manager) = create_test_manager(&["a", "stale", "b"]);
        let options: Vec<_> = manager.replace_options().into_iter().map(|o| o.id).collect();
        assert_eq!(options, ids(&["a", "b"]));
    }

    #[test]
    fn test_event_notices() {
        assert_eq!(SelectionEvent::Added { id: "a".into() }.notices(), vec![COIN_ADDED_NOTICE]);
        assert_eq!(SelectionEvent::Removed { id: "a".into() }.notices(), vec![COIN_REMOVED_NOTICE]);
    }

    #[test]
    fn test_selection_survives_restart_on_disk() {
        let temp_dir = tempfile::TempDir::new().unwrap();

        {
            let store = Arc::new(persistence::create_local_persistence(temp_dir.path()).unwrap());
            let mut manager = SelectionManager::hydrate(store, SelectionConfig::default()).unwrap();
            manager.request_add("bitcoin").unwrap();
            manager.request_add("ethereum").unwrap();
            manager.remove("bitcoin").unwrap();
        }

        let store = Arc::new(persistence::create_local_persistence(temp_dir.path()).unwrap());
        let manager = SelectionManager::hydrate(store, SelectionConfig::default()).unwrap();
        assert_eq!(manager.selection(), ["ethereum"]);
    }

    #[test]
    fn test_corrupt_file_hydrates_empty() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("selectedCoinIds.json"), "{not json").unwrap();

        let store = Arc::new(persistence::create_local_persistence(temp_dir.path()).unwrap());
        let manager = SelectionManager::hydrate(store, SelectionConfig::default()).unwrap();
        assert!(manager.is_empty());
    }

    #[test]
    fn test_custom_max_size() {
        let store = Arc::new(InMemoryPersistence::default());
        let config = SelectionConfig { max_size: 2, ..Default::default() };
        let mut manager = SelectionManager::hydrate(store, config).unwrap();

        manager.request_add("a").unwrap();
        manager.request_add("b").unwrap();
        assert!(!manager.can_add());
        assert!(matches!(
            manager.request_add("c").unwrap(),
            SelectionChange::AwaitingReplacement { .. }
        ));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Unique ids drawn from a small alphabet so collisions with candidates are common
    fn selection_strategy(max_len: usize) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::hash_set("[a-h]", 0..=max_len)
            .prop_map(|set| set.into_iter().collect::<Vec<String>>())
    }

    proptest! {
        #[test]
        fn add_appends_when_room(selection in selection_strategy(4), id in "[a-z]{2}") {
            // Two-letter ids never collide with the one-letter selection
            let next = rules::add(&selection, &id, 5);
            prop_assert_eq!(next.len(), selection.len() + 1);
            prop_assert_eq!(&next[..selection.len()], &selection[..]);
            prop_assert_eq!(next.last(), Some(&id));
        }

        #[test]
        fn full_selection_rejects_add(
            selection in proptest::collection::hash_set("[a-h]", 5).prop_map(|s| s.into_iter().collect::<Vec<String>>()),
            id in "[a-z]{2}",
        ) {
            prop_assert!(!rules::can_add(&selection, 5));
            prop_assert_eq!(rules::add(&selection, &id, 5), selection);
        }

        #[test]
        fn remove_is_idempotent_and_order_preserving(selection in selection_strategy(5), id in "[a-h]") {
            let once = rules::remove(&selection, &id);
            let twice = rules::remove(&once, &id);
            prop_assert_eq!(&once, &twice);

            let expected: Vec<String> = selection.iter().filter(|s| **s != id).cloned().collect();
            prop_assert_eq!(once, expected);
        }

        #[test]
        fn replace_swaps_one_for_one(selection in selection_strategy(5), victim_index in 0usize..5, id in "[a-z]{2}") {
            prop_assume!(!selection.is_empty());
            let victim = selection[victim_index % selection.len()].clone();

            let next = rules::replace(&selection, &victim, &id, 5);

            let mut expected: Vec<String> = selection.iter().filter(|s| **s != victim).cloned().collect();
            expected.push(id.clone());
            prop_assert_eq!(next.len(), selection.len());
            prop_assert!(!next.contains(&victim));
            prop_assert_eq!(next, expected);
        }

        #[test]
        fn manager_never_exceeds_limit(ops in proptest::collection::vec(("[a-h]", any::<bool>(), 0usize..6), 0..60)) {
            let store = Arc::new(InMemoryPersistence::default());
            let mut manager = SelectionManager::hydrate(store.clone(), SelectionConfig::default()).unwrap();

            for (id, checked, victim_index) in ops {
                if manager.pending().is_some() {
                    if victim_index == 5 {
                        manager.cancel_replacement().unwrap();
                    } else {
                        let victim = manager.selection()[victim_index % manager.len()].clone();
                        manager.confirm_replacement(&victim).unwrap();
                    }
                    continue;
                }
                manager.toggle(&id, checked).unwrap();

                let unique: std::collections::HashSet<_> = manager.selection().iter().collect();
                prop_assert!(manager.len() <= 5);
                prop_assert_eq!(unique.len(), manager.len());
                prop_assert_eq!(persisted(&store), manager.selection().to_vec());
            }
        }
    }
}
