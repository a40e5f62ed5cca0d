//! Ordered storage adapter registry

use std::sync::Arc;

use mapvault_domain::{MapId, MapVaultError, Result};

use crate::ports::StorageAdapter;

/// Holds the configured backends and resolves which one owns an identifier.
///
/// Registration order is a priority invariant: the first adapter registered
/// is the default, and ties between adapters recognising the same identifier
/// go to the earlier one. The list is an explicit sequence, never a map, so
/// iteration order is guaranteed.
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn StorageAdapter>>,
}

impl AdapterRegistry {
    /// Create a registry from an ordered adapter list.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an empty list; resolution always needs a
    /// default to fall back to.
    pub fn new(adapters: Vec<Arc<dyn StorageAdapter>>) -> Result<Self> {
        if adapters.is_empty() {
            return Err(MapVaultError::InvalidInput(
                "adapter registry requires at least one adapter".to_string(),
            ));
        }
        Ok(Self { adapters })
    }

    /// Resolve the adapter owning the first recognised identifier.
    ///
    /// Identifiers are tried in caller-given priority order (an explicit
    /// backend tag before the map id itself, say); for each identifier the
    /// adapters are tried in registration order. If nothing matches, the
    /// first registered adapter wins.
    pub fn resolve(&self, identifiers: &[&MapId]) -> Arc<dyn StorageAdapter> {
        for map_id in identifiers {
            for adapter in &self.adapters {
                if adapter.recognizes(map_id) {
                    return Arc::clone(adapter);
                }
            }
        }
        Arc::clone(&self.adapters[0])
    }
}
