//! Key-value persistence behind the history store.
//!
//! In the browser this is `window.localStorage`. Natively and in tests an
//! in-memory map stands in for it.

use crate::error::StorageError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// String key-value storage with localStorage semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same map, the way every handle to
/// `localStorage` sees the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::KeyValueStore;
    use crate::error::StorageError;

    /// `window.localStorage`, looked up on each access.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LocalStorage;

    impl LocalStorage {
        pub fn new() -> Self {
            Self
        }

        fn storage(&self) -> Option<web_sys::Storage> {
            web_sys::window()?.local_storage().ok()?
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.storage()?.get_item(key).ok()?
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage()
                .ok_or(StorageError::NotAvailable)?
                .set_item(key, value)
                .map_err(|_| StorageError::QuotaExceeded)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.storage()
                .ok_or(StorageError::NotAvailable)?
                .remove_item(key)
                .map_err(|_| StorageError::AccessDenied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v".to_string()));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
        // removing twice is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_clones_share_entries() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set("shared", "1").unwrap();
        assert_eq!(b.get("shared"), Some("1".to_string()));
        assert!(b.contains("shared"));
        assert_eq!(b.len(), 1);
    }
}
