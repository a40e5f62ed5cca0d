//! # Mapvault Domain
//!
//! Business domain types and models for mapvault.
//!
//! This crate contains:
//! - Domain data types (MapId, Document, MapInfo, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other mapvault crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
