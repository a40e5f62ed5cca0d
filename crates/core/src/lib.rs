//! # Mapvault Core
//!
//! Storage orchestration for map documents.
//!
//! This crate contains:
//! - Port traits for storage backends and local key-value persistence
//! - The adapter registry and offline fallback store
//! - Retry/backoff resilience primitives
//! - Content decoding (native JSON and legacy FreeMind import)
//! - The load/save orchestrators and their event channel
//!
//! ## Architecture
//! - Depends only on `mapvault-domain` internally
//! - Backend transports live behind the [`ports::StorageAdapter`] trait
//! - All state transitions are published as [`events::MapEvent`]s

pub mod content;
pub mod embedded;
pub mod events;
pub mod fallback;
pub mod ports;
pub mod registry;
pub mod repository;
pub mod resilience;

// Re-export commonly used items
pub use embedded::EmbeddedMaps;
pub use events::{MapEvent, ProgressSink, ProgressUpdate};
pub use fallback::OfflineFallbackStore;
pub use ports::{KeyValueStore, StorageAdapter};
pub use registry::AdapterRegistry;
pub use repository::MapRepository;
