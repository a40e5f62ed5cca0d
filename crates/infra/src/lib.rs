//! # Mapvault Infra
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - Key-value stores backing the offline fallback (in-memory, single file)
//! - The local filesystem storage adapter
//! - The configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `mapvault-core`
//! - Cloud and drive backend transports live in their own crates; this one
//!   only ships the backends that need nothing but the local machine

pub mod adapters;
pub mod config;
pub mod storage;

// Re-export commonly used items
pub use adapters::FileSystemAdapter;
pub use storage::{FileStore, MemoryStore};
