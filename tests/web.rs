#![cfg(target_arch = "wasm32")]

use raffle_wasm::storage::LocalStorage;
use raffle_wasm::{HistoryStore, KeyValueStore, WinRecord, HISTORY_KEY};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_storage_round_trip() {
    let store = LocalStorage::new();
    store.remove(HISTORY_KEY).unwrap();

    let mut hs = HistoryStore::open(store);
    assert!(hs.history().is_empty());
    hs.record(WinRecord::new("0042", 1000)).unwrap();

    let reopened = HistoryStore::open(LocalStorage::new());
    assert_eq!(reopened.history(), hs.history());

    hs.clear().unwrap();
    assert_eq!(LocalStorage::new().get(HISTORY_KEY), None);
}
