//! Persisted draw history.
//!
//! The whole history lives under one storage key as a JSON array, newest
//! first. Every change rewrites the full array.

use crate::error::StorageError;
use crate::storage::KeyValueStore;
use crate::types::{History, WinRecord};

/// Storage key for the serialized history.
pub const HISTORY_KEY: &str = "raffleWinHistory";

pub struct HistoryStore<S: KeyValueStore> {
    store: S,
    history: History,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Wrap a store and load whatever history it already holds.
    pub fn open(store: S) -> Self {
        let mut this = Self {
            store,
            history: History::new(),
        };
        this.load();
        this
    }

    /// Re-read the persisted history. Missing or malformed data yields an
    /// empty history.
    pub fn load(&mut self) -> &History {
        self.history = match self.store.get(HISTORY_KEY) {
            None => History::new(),
            Some(raw) => match serde_json::from_str::<History>(&raw) {
                Ok(history) => history,
                Err(e) => {
                    log::warn!("Discarding malformed draw history: {e}");
                    History::new()
                }
            },
        };
        &self.history
    }

    /// Prepend `entry` and persist the result.
    ///
    /// The in-memory history only changes once the write has succeeded.
    pub fn record(&mut self, entry: WinRecord) -> Result<&History, StorageError> {
        let next = self.history.prepend(entry);
        let json = serde_json::to_string(&next)?;
        self.store.set(HISTORY_KEY, &json)?;
        self.history = next;
        Ok(&self.history)
    }

    /// Remove the persisted entry and drop every record.
    ///
    /// If the removal fails the in-memory history is left as it was.
    pub fn clear(&mut self) -> Result<&History, StorageError> {
        self.store.remove(HISTORY_KEY)?;
        self.history = History::new();
        Ok(&self.history)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
