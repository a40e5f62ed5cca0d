//! Event channel published by the orchestrators
//!
//! Operations are long-running and asynchronous, so every state transition
//! is communicated through [`MapEvent`]s rather than return values. The
//! taxonomy is closed: consumers match exhaustively instead of subscribing
//! to string event names.
//!
//! Events at genuine suspension points carry one-shot continuation handles.
//! Each handle may be invoked at most once (it consumes itself); dropping a
//! handle abandons the suspended operation, leaving the already-emitted
//! event as the terminal one.

use std::fmt;
use std::sync::Arc;

use mapvault_domain::{Document, FailureKind, MapId};
use tokio::sync::oneshot;

/// Progress reported by adapters and the retry executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Bytes transferred so far out of an expected total.
    Transferred { done: u64, total: u64 },
    /// Free-form status note ("Network problem... will retry shortly").
    Note(String),
}

impl ProgressUpdate {
    pub fn note(message: impl Into<String>) -> Self {
        Self::Note(message.into())
    }

    /// Render the update the way the UI expects it: transfer progress as a
    /// rounded percentage, notes verbatim.
    pub fn message(&self) -> String {
        match self {
            Self::Transferred { done, total } => {
                let total = (*total).max(1);
                format!("{}%", (100 * done + total / 2) / total)
            }
            Self::Note(message) => message.clone(),
        }
    }
}

/// Cloneable sink adapters report progress into.
///
/// The orchestrator wires the sink to the event channel so transfer
/// percentages surface as `Loading`/`Saving` events with a progress message.
#[derive(Clone)]
pub struct ProgressSink {
    inner: Arc<dyn Fn(ProgressUpdate) + Send + Sync>,
}

impl ProgressSink {
    pub fn new(report: impl Fn(ProgressUpdate) + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(report) }
    }

    /// A sink that discards every update.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    pub fn report(&self, update: ProgressUpdate) {
        (self.inner)(update);
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressSink")
    }
}

/// Outcome of the offline-fallback choice offered on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FallbackDecision {
    UseLocal,
    UseAdapter,
}

/// Continuation for [`MapEvent::OfflineFallbackExists`].
///
/// The caller decides whether to keep the locally cached copy or discard it
/// and load from the real backend.
#[derive(Debug)]
pub struct FallbackChoice {
    tx: oneshot::Sender<FallbackDecision>,
}

impl FallbackChoice {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<FallbackDecision>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Use the cached local copy; no network call will be made.
    pub fn use_local(self) {
        let _ = self.tx.send(FallbackDecision::UseLocal);
    }

    /// Discard the local copy and load from the owning backend.
    pub fn use_adapter(self) {
        let _ = self.tx.send(FallbackDecision::UseAdapter);
    }
}

/// Continuation for auth events: a manual, user-triggered single retry.
#[derive(Debug)]
pub struct RetryHandle {
    tx: oneshot::Sender<()>,
}

impl RetryHandle {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Re-issue the failed operation once, with backend auth prompts allowed.
    pub fn retry(self) {
        let _ = self.tx.send(());
    }
}

/// Continuation for [`MapEvent::SaveUnauthorized`]: save a copy instead of
/// overwriting the document the caller has no right to.
#[derive(Debug)]
pub struct SaveAsNewHandle {
    tx: oneshot::Sender<()>,
}

impl SaveAsNewHandle {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn save_as_new(self) {
        let _ = self.tx.send(());
    }
}

/// Continuation for a network save failure: persist the document into the
/// offline fallback store as a degraded-but-successful outcome.
#[derive(Debug)]
pub struct StoreLocallyHandle {
    tx: oneshot::Sender<()>,
}

impl StoreLocallyHandle {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn store_locally(self) {
        let _ = self.tx.send(());
    }
}

/// Events published by the load/save orchestrators.
#[derive(Debug)]
pub enum MapEvent {
    /// A load started, or made transfer progress.
    Loading { map_id: MapId, progress: Option<String> },
    /// A locally cached copy exists; the caller must choose how to proceed.
    OfflineFallbackExists { map_id: MapId, choice: FallbackChoice },
    /// A document was materialised; replaces the previous current map.
    Loaded { map_id: MapId, document: Document, not_sharable: bool },
    /// Permission denied on load; terminal for this attempt.
    LoadUnauthorized { map_id: MapId, reason: FailureKind },
    /// The backend requires authentication before the operation can proceed.
    AuthRequired { provider: String, retry: RetryHandle },
    /// Authentication was attempted and rejected.
    AuthorisationFailed { provider: String, retry: RetryHandle },
    /// Load failed terminally for any other reason.
    LoadFailed { map_id: MapId, reason: FailureKind, label: String },
    /// A save started, or made transfer progress.
    Saving { provider: String, progress: Option<String> },
    /// Permission denied on save; a copy can be created instead.
    SaveUnauthorized { provider: String, save_as_new: SaveAsNewHandle },
    /// A save completed; `id_changed` is true when the backend assigned a
    /// different identifier than before.
    Saved { map_id: MapId, document: Document, id_changed: bool },
    /// Save failed; a network failure carries a local-fallback continuation.
    SaveFailed {
        reason: FailureKind,
        label: String,
        store_locally: Option<StoreLocallyHandle>,
    },
}
