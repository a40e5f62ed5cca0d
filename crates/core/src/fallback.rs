//! Offline fallback store
//!
//! A local cache of documents keyed by map identifier, kept as a safety net
//! independent of which backend owns the map. Entries are created when a
//! save fails over the network and the user chooses to keep a local copy,
//! consulted on every load and save, and removed once an operation
//! round-trips successfully through a real adapter.

use std::sync::Arc;

use mapvault_domain::{Document, MapId, MapVaultError, Result};

use crate::ports::KeyValueStore;

const KEY_PREFIX: &str = "fallback-";

/// Document cache over a local key-value store.
pub struct OfflineFallbackStore {
    store: Arc<dyn KeyValueStore>,
}

impl OfflineFallbackStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(map_id: &MapId) -> String {
        format!("{KEY_PREFIX}{map_id}")
    }

    /// Look up the cached document for `map_id`, if any.
    pub async fn lookup(&self, map_id: &MapId) -> Result<Option<Document>> {
        match self.store.get(&Self::key(map_id)).await? {
            Some(raw) => {
                let document = serde_json::from_str(&raw).map_err(|e| {
                    MapVaultError::LocalStorage(format!("corrupt fallback entry: {e}"))
                })?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    /// Cache `document` under `map_id`.
    ///
    /// # Errors
    /// A persistence failure surfaces as `LocalStorage`; it is never
    /// silently swallowed.
    pub async fn put(&self, map_id: &MapId, document: &Document) -> Result<()> {
        let raw = serde_json::to_string(document)
            .map_err(|e| MapVaultError::LocalStorage(e.to_string()))?;
        self.store.put(&Self::key(map_id), &raw).await
    }

    /// Drop the cached entry for `map_id`, if present.
    pub async fn remove(&self, map_id: &MapId) -> Result<()> {
        self.store.remove(&Self::key(map_id)).await
    }
}
