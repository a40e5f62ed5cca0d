//! Embedded read-only map bundle
//!
//! Documents shipped with the application (tutorials, the default map).
//! Loading one needs no backend, no retry and no backoff; the result is
//! always marked not sharable.

use std::collections::HashMap;

use mapvault_domain::{Document, MapId};
use serde_json::Value;

/// Bundle of embedded documents, matched case-insensitively by identifier.
#[derive(Debug, Default)]
pub struct EmbeddedMaps {
    maps: HashMap<String, Value>,
}

impl EmbeddedMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a bundled document.
    pub fn with_map(mut self, map_id: impl Into<String>, content: Value) -> Self {
        self.insert(map_id, content);
        self
    }

    pub fn insert(&mut self, map_id: impl Into<String>, content: Value) {
        self.maps.insert(map_id.into().to_lowercase(), content);
    }

    /// Look up a bundled document; each caller gets its own copy.
    pub fn get(&self, map_id: &MapId) -> Option<Document> {
        self.maps
            .get(&map_id.as_str().to_lowercase())
            .cloned()
            .map(Document::from_value)
    }
}
