//! Save/load persistence
//!
//! A minimal key/value storage seam:
//! - `LocalStorage` on web (wasm32)
//! - `MemoryStorage` natively and in tests
//! - JSON helpers that log and degrade to `None` on any failure

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// String key/value store
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;

    /// Returns false when the value could not be stored
    fn set(&mut self, key: &str, value: &str) -> bool;
}

/// In-process storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.values.insert(key.to_string(), value.to_string());
        true
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if inner.is_none() {
            log::warn!("LocalStorage unavailable - nothing will persist");
        }
        Self { inner }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        match &self.inner {
            Some(storage) => storage.set_item(key, value).is_ok(),
            None => false,
        }
    }
}

/// Read and decode a JSON value
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let json = storage.get(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding corrupt '{}' entry: {}", key, e);
            None
        }
    }
}

/// Encode and store a JSON value
pub fn save_json<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to encode '{}': {}", key, e);
            return false;
        }
    };
    let stored = storage.set(key, &json);
    if !stored {
        log::warn!("Failed to store '{}'", key);
    }
    stored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut storage = MemoryStorage::default();
        assert!(save_json(&mut storage, "numbers", &vec![1u32, 2, 3]));
        assert_eq!(load_json::<Vec<u32>>(&storage, "numbers"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_missing_and_corrupt_entries() {
        let mut storage = MemoryStorage::default();
        assert_eq!(load_json::<Vec<u32>>(&storage, "absent"), None);

        storage.set("broken", "{not json");
        assert_eq!(load_json::<Vec<u32>>(&storage, "broken"), None);
    }
}
