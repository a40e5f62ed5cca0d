//! Port interfaces for storage backends and local persistence
//!
//! These traits define the boundaries between the orchestration layer
//! and infrastructure implementations.

use async_trait::async_trait;
use mapvault_domain::{AdapterPayload, MapId, MapInfo, Result};

use crate::events::ProgressSink;

/// Capability contract every storage backend must implement.
///
/// Transport details (HTTP, proprietary SDKs, browser storage) are entirely
/// the adapter's concern; the orchestrator only sees this surface.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Whether this backend owns the given identifier format.
    fn recognizes(&self, map_id: &MapId) -> bool;

    /// Human-readable backend name, used in diagnostics and auth prompts.
    fn description(&self) -> &str;

    /// Whether documents from this backend must not be shared.
    fn not_sharable(&self) -> bool {
        false
    }

    /// Load a document payload.
    ///
    /// `interactive` is false during automatic attempts and true for
    /// user-triggered manual retries, where the backend may open its own
    /// authentication prompts. Transfer progress is reported through
    /// `progress`.
    async fn load_map(
        &self,
        map_id: &MapId,
        interactive: bool,
        progress: &ProgressSink,
    ) -> Result<AdapterPayload>;

    /// Save a document, returning the stored identity.
    ///
    /// A backend may assign a different identifier than the one supplied
    /// (always does for [`MapId::unsaved`]).
    async fn save_map(
        &self,
        info: &MapInfo,
        interactive: bool,
        progress: &ProgressSink,
    ) -> Result<MapInfo>;
}

/// Local key-value persistence used by the offline fallback store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`. Removing a missing key is not
    /// an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
