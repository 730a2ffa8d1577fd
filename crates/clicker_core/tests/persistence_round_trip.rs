//! Save/load round trips over arbitrary states, including counters far
//! beyond 64 bits.

use clicker_core::persistence::{MemoryStore, PersistenceAdapter};
use clicker_core::save::SaveDocument;
use clicker_test_utils::fixtures::{late_game_state, player};
use clicker_test_utils::proptest::prelude::*;
use clicker_test_utils::strategies::{arb_settings, arb_state};

#[test]
fn test_late_game_state_survives_store() {
    let store = MemoryStore::new();
    let who = player("carol");
    let state = late_game_state();
    assert!(state.bytes().bits() > 64);

    store.save(&who, &state, Default::default()).unwrap();
    let (loaded, _) = store.load_or_initialize(&who).unwrap();
    assert_eq!(loaded, state);
}

#[test]
fn test_numbers_are_written_as_decimal_strings() {
    let doc = SaveDocument::capture(&late_game_state(), Default::default());
    let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
    let bytes = &value["progress"]["bytes"];
    assert!(bytes.is_string());
    assert_eq!(bytes.as_str().unwrap(), late_game_state().bytes().to_string());
}

proptest! {
    #[test]
    fn prop_save_then_load_is_identity(state in arb_state(), settings in arb_settings()) {
        let store = MemoryStore::new();
        let who = player("prop");
        store.save(&who, &state, settings).unwrap();
        let (loaded, loaded_settings) = store.load_or_initialize(&who).unwrap();
        prop_assert_eq!(loaded, state);
        prop_assert_eq!(loaded_settings, settings);
    }
}
