//! Error types used throughout the storage layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for mapvault
#[derive(Error, Debug)]
pub enum MapVaultError {
    /// Transient transport failure; the only retryable kind.
    #[error("network error: {0}")]
    Network(String),

    /// The backend requires an authentication flow before the operation can
    /// proceed.
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// An authentication flow was attempted and rejected.
    #[error("authentication failed: {0}")]
    FailedAuthentication(String),

    /// The authenticated principal has no right to the document.
    #[error("access denied: {0}")]
    NoAccessAllowed(String),

    /// The document exceeds the backend's size limit (save only).
    #[error("file too large: {0}")]
    FileTooLarge(String),

    /// Persisting to the offline fallback store itself failed.
    #[error("local storage failed: {0}")]
    LocalStorage(String),

    /// Malformed or unrecognised document payload.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MapVaultError {
    /// Classify this error into the closed failure taxonomy used by the
    /// retry policy and the event channel.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) => FailureKind::NetworkError,
            Self::NotAuthenticated(_) => FailureKind::NotAuthenticated,
            Self::FailedAuthentication(_) => FailureKind::FailedAuthentication,
            Self::NoAccessAllowed(_) => FailureKind::NoAccessAllowed,
            Self::FileTooLarge(_) => FailureKind::FileTooLarge,
            Self::LocalStorage(_) => FailureKind::LocalStorageFailed,
            Self::Decode(_) => FailureKind::DecodeError,
            Self::Config(_) | Self::InvalidInput(_) | Self::Internal(_) => FailureKind::Other,
        }
    }

    /// Whether blind retry is worthwhile for this error.
    pub fn is_transient(&self) -> bool {
        self.kind() == FailureKind::NetworkError
    }
}

/// Closed classification of storage failures.
///
/// Unlike [`MapVaultError`] this is `Copy` and carries no detail text, which
/// makes it suitable for event payloads and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    NetworkError,
    NotAuthenticated,
    FailedAuthentication,
    NoAccessAllowed,
    FileTooLarge,
    LocalStorageFailed,
    DecodeError,
    Other,
}

impl FailureKind {
    /// Stable label suitable for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network-error",
            Self::NotAuthenticated => "not-authenticated",
            Self::FailedAuthentication => "failed-authentication",
            Self::NoAccessAllowed => "no-access-allowed",
            Self::FileTooLarge => "file-too-large",
            Self::LocalStorageFailed => "local-storage-failed",
            Self::DecodeError => "decode-error",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for mapvault operations
pub type Result<T> = std::result::Result<T, MapVaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_classification() {
        assert_eq!(
            MapVaultError::Network("timeout".into()).kind(),
            FailureKind::NetworkError
        );
        assert_eq!(
            MapVaultError::NoAccessAllowed("read-only".into()).kind(),
            FailureKind::NoAccessAllowed
        );
        assert_eq!(MapVaultError::Internal("oops".into()).kind(), FailureKind::Other);
    }

    #[test]
    fn only_network_errors_are_transient() {
        assert!(MapVaultError::Network("reset".into()).is_transient());
        assert!(!MapVaultError::NotAuthenticated("expired".into()).is_transient());
        assert!(!MapVaultError::FileTooLarge("12MB".into()).is_transient());
    }

    #[test]
    fn failure_kind_labels() {
        assert_eq!(FailureKind::NetworkError.as_str(), "network-error");
        assert_eq!(FailureKind::LocalStorageFailed.as_str(), "local-storage-failed");
        assert_eq!(FailureKind::NoAccessAllowed.to_string(), "no-access-allowed");
    }
}
