//! Per-device namespacing over the session store.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DraftdeckError, Result};
use crate::storage::KeyValueStore;

/// Derive the storage key for `logical_key` on `device_id`
pub fn session_key(logical_key: &str, device_id: &str) -> String {
    format!("{}_{}", logical_key, device_id)
}

/// Session store whose keys are suffixed with a device id
pub struct ScopedStore {
    store: Box<dyn KeyValueStore>,
}

impl ScopedStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        device_id: &str,
        logical_key: &str,
        value: &T,
    ) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.store.set_item(&session_key(logical_key, device_id), &text)
    }

    /// Look up and decode; a malformed value is an error carrying the key
    pub fn try_get<T: DeserializeOwned>(
        &self,
        device_id: &str,
        logical_key: &str,
    ) -> Result<Option<T>> {
        let key = session_key(logical_key, device_id);
        let Some(text) = self.store.get_item(&key) else {
            return Ok(None);
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| DraftdeckError::MalformedData {
                key,
                reason: e.to_string(),
            })
    }

    /// Like [`try_get`](Self::try_get), but malformed values are logged and read as absent
    pub fn get<T: DeserializeOwned>(&self, device_id: &str, logical_key: &str) -> Option<T> {
        match self.try_get(device_id, logical_key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Error getting device data: {}", e);
                None
            }
        }
    }

    pub fn clear(&mut self, device_id: &str, logical_key: &str) -> Result<()> {
        self.store.remove_item(&session_key(logical_key, device_id))
    }

    /// Logical keys stored for `device_id`
    pub fn logical_keys(&self, device_id: &str) -> Vec<String> {
        let suffix = format!("_{}", device_id);
        self.store
            .keys()
            .into_iter()
            .filter_map(|key| key.strip_suffix(&suffix).map(str::to_string))
            .collect()
    }
}
