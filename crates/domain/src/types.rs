//! Core domain types for map storage

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a map document within a storage backend.
///
/// Backends recognise their own identifier formats (typically by prefix);
/// the identifier `"new"` is a sentinel meaning the document has not been
/// assigned a backend identity yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(String);

impl MapId {
    /// Sentinel identifier for a document that has never been saved.
    pub const NEW: &'static str = "new";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The sentinel identifier used to force save-as-new semantics.
    pub fn unsaved() -> Self {
        Self(Self::NEW.to_string())
    }

    pub fn is_new(&self) -> bool {
        self.0 == Self::NEW
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MapId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An opaque map document payload.
///
/// The storage layer treats the content as inert data; the only structure it
/// ever reads is the root node's identity marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Identity marker of the root node, when present.
    pub fn root_id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }
}

/// The currently materialised document together with its backend identity.
///
/// Exactly one `MapInfo` is live per repository instance; it is replaced
/// atomically on every successful load or save, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct MapInfo {
    pub map_id: MapId,
    pub document: Document,
}

impl MapInfo {
    pub fn new(map_id: MapId, document: Document) -> Self {
        Self { map_id, document }
    }
}

/// Content kind reported by a storage adapter alongside a loaded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimeKind {
    /// Native JSON document format (`application/json`).
    Json,
    /// Raw bytes that still parse as the native JSON format.
    OctetStream,
    /// Legacy FreeMind XML import format, converted on the fly.
    Freemind,
    /// Anything else; always a decode error on load.
    Other(String),
}

impl MimeKind {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "application/json" => Self::Json,
            "application/octet-stream" => Self::OctetStream,
            "application/x-freemind" | "application/vnd-freemind" => Self::Freemind,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Json => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Freemind => "application/x-freemind",
            Self::Other(mime) => mime,
        }
    }
}

/// Raw payload handed back by a storage adapter's load operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterPayload {
    pub content: String,
    pub mime: MimeKind,
}

impl AdapterPayload {
    pub fn new(content: impl Into<String>, mime: MimeKind) -> Self {
        Self { content: content.into(), mime }
    }

    pub fn json(content: impl Into<String>) -> Self {
        Self::new(content, MimeKind::Json)
    }
}
