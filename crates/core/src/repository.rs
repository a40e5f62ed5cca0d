//! Load/save orchestration
//!
//! [`MapRepository`] coordinates the offline fallback store, the adapter
//! registry and the retry executor to materialise and persist documents.
//! All state transitions flow out through the event channel; suspension
//! points (the offline-fallback choice, auth retries, the local-save offer)
//! await one-shot continuations carried by the emitted events.
//!
//! A superseding load or save does not cancel in-flight work; consumers
//! must compare the `map_id` on `Loaded`/`Saved` events against what they
//! currently display before acting.

use std::sync::{Mutex, PoisonError};

use mapvault_domain::{Document, FailureKind, MapId, MapInfo, MapVaultError, RepositoryConfig};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::content;
use crate::embedded::EmbeddedMaps;
use crate::events::{
    FallbackChoice, FallbackDecision, MapEvent, ProgressSink, RetryHandle, SaveAsNewHandle,
    StoreLocallyHandle,
};
use crate::fallback::OfflineFallbackStore;
use crate::registry::AdapterRegistry;
use crate::resilience::{LinearBackoff, RetryExecutor, TransientRetry};

/// Storage orchestrator owning the single live [`MapInfo`].
pub struct MapRepository {
    adapters: AdapterRegistry,
    fallback: OfflineFallbackStore,
    embedded: EmbeddedMaps,
    config: RepositoryConfig,
    events: mpsc::UnboundedSender<MapEvent>,
    current: Mutex<Option<MapInfo>>,
}

impl MapRepository {
    /// Create a repository and the receiving end of its event channel.
    pub fn new(
        adapters: AdapterRegistry,
        fallback: OfflineFallbackStore,
        embedded: EmbeddedMaps,
        config: RepositoryConfig,
    ) -> (Self, mpsc::UnboundedReceiver<MapEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let repository = Self {
            adapters,
            fallback,
            embedded,
            config,
            events,
            current: Mutex::new(None),
        };
        (repository, receiver)
    }

    /// Identifier of the currently live map, if any.
    pub fn current_map_id(&self) -> Option<MapId> {
        self.lock_current().as_ref().map(|info| info.map_id.clone())
    }

    /// Install a document directly, bypassing any backend (imports, tests).
    pub fn set_map(&self, document: Document, map_id: MapId, not_sharable: bool) {
        self.install(MapInfo::new(map_id.clone(), document.clone()));
        self.emit(MapEvent::Loaded { map_id, document, not_sharable });
    }

    /// Load the document identified by `map_id`.
    ///
    /// Emits `Loading` immediately; every outcome, including the
    /// offline-fallback choice and auth flows, is communicated through the
    /// event channel rather than a return value.
    pub async fn load_map(&self, map_id: MapId) {
        self.emit(MapEvent::Loading { map_id: map_id.clone(), progress: None });

        // A broken local store must not block loading from the backend, so
        // lookup failures degrade to "no cached copy".
        let cached = match self.fallback.lookup(&map_id).await {
            Ok(cached) => cached,
            Err(error) => {
                warn!(%map_id, %error, "offline fallback lookup failed");
                None
            }
        };

        if let Some(document) = cached {
            let (choice, decision) = FallbackChoice::channel();
            self.emit(MapEvent::OfflineFallbackExists { map_id: map_id.clone(), choice });
            match decision.await {
                Ok(FallbackDecision::UseLocal) => {
                    self.set_map(document, map_id, true);
                    return;
                }
                Ok(FallbackDecision::UseAdapter) => {}
                Err(_) => {
                    debug!(%map_id, "offline fallback choice abandoned");
                    return;
                }
            }
        }

        self.load_from_adapter(map_id).await;
    }

    async fn load_from_adapter(&self, map_id: MapId) {
        // A real load attempt supersedes whatever the fallback holds.
        if let Err(error) = self.fallback.remove(&map_id).await {
            warn!(%map_id, %error, "could not drop stale fallback entry");
        }

        if let Some(document) = self.embedded.get(&map_id) {
            self.set_map(document, map_id, true);
            return;
        }

        let adapter = self.adapters.resolve(&[&map_id]);
        let progress = self.load_progress(&map_id);
        let executor = RetryExecutor::new(
            TransientRetry::new(self.config.max_retry_attempts),
            LinearBackoff::with_increment(self.config.backoff_increment()),
            progress.clone(),
        );

        let mut result = executor
            .execute(|| adapter.load_map(&map_id, false, &progress))
            .await;

        loop {
            match result {
                Ok(payload) => {
                    match content::decode_payload(&payload) {
                        Ok(document) => self.set_map(document, map_id, adapter.not_sharable()),
                        Err(error) => self.emit(MapEvent::LoadFailed {
                            map_id,
                            reason: error.kind(),
                            label: label(&error, adapter.description()),
                        }),
                    }
                    return;
                }
                Err(error) => match error.kind() {
                    FailureKind::NoAccessAllowed => {
                        self.emit(MapEvent::LoadUnauthorized { map_id, reason: error.kind() });
                        return;
                    }
                    kind @ (FailureKind::FailedAuthentication | FailureKind::NotAuthenticated) => {
                        if self.await_auth_retry(kind, adapter.description()).await.is_none() {
                            return;
                        }
                        self.emit(MapEvent::Loading { map_id: map_id.clone(), progress: None });
                        result = adapter.load_map(&map_id, true, &progress).await;
                    }
                    kind => {
                        self.emit(MapEvent::LoadFailed {
                            map_id,
                            reason: kind,
                            label: label(&error, adapter.description()),
                        });
                        return;
                    }
                },
            }
        }
    }

    /// Save the current document, optionally to an explicitly chosen
    /// backend.
    ///
    /// The explicit hint takes precedence over the document's current home
    /// when resolving the adapter.
    pub async fn publish_map(&self, target_hint: Option<MapId>) {
        let Some(info) = self.lock_current().clone() else {
            self.emit(MapEvent::SaveFailed {
                reason: FailureKind::Other,
                label: "no map loaded".to_string(),
                store_locally: None,
            });
            return;
        };

        let mut identifiers: Vec<&MapId> = Vec::with_capacity(2);
        if let Some(hint) = target_hint.as_ref() {
            identifiers.push(hint);
        }
        identifiers.push(&info.map_id);
        let adapter = self.adapters.resolve(&identifiers);
        let provider = adapter.description().to_string();

        self.emit(MapEvent::Saving { provider: provider.clone(), progress: None });

        // An unresolved fallback entry marks a pending conflict; retrying
        // would only mask it, so the save gets a single attempt.
        let fallback_exists = match self.fallback.lookup(&info.map_id).await {
            Ok(entry) => entry.is_some(),
            Err(error) => {
                warn!(map_id = %info.map_id, %error, "offline fallback lookup failed");
                false
            }
        };
        let budget = if fallback_exists { 0 } else { self.config.max_retry_attempts };

        let progress = self.save_progress(&provider);
        let executor = RetryExecutor::new(
            TransientRetry::new(budget),
            LinearBackoff::with_increment(self.config.backoff_increment()),
            progress.clone(),
        );

        let mut result = executor
            .execute(|| adapter.save_map(&info, false, &progress))
            .await;

        loop {
            match result {
                Ok(saved) => {
                    if let Err(error) = self.fallback.remove(&info.map_id).await {
                        warn!(map_id = %info.map_id, %error, "could not drop fallback entry");
                    }
                    let id_changed = saved.map_id != info.map_id;
                    self.install(saved.clone());
                    self.emit(MapEvent::Saved {
                        map_id: saved.map_id,
                        document: saved.document,
                        id_changed,
                    });
                    return;
                }
                Err(error) => match error.kind() {
                    FailureKind::NoAccessAllowed => {
                        let (save_as_new, resumed) = SaveAsNewHandle::channel();
                        self.emit(MapEvent::SaveUnauthorized {
                            provider: provider.clone(),
                            save_as_new,
                        });
                        if resumed.await.is_err() {
                            debug!(%provider, "save-as-new offer abandoned");
                            return;
                        }
                        self.emit(MapEvent::Saving {
                            provider: provider.clone(),
                            progress: Some("Creating a new file".to_string()),
                        });
                        let as_new = MapInfo::new(MapId::unsaved(), info.document.clone());
                        result = adapter.save_map(&as_new, true, &progress).await;
                    }
                    kind @ (FailureKind::FailedAuthentication | FailureKind::NotAuthenticated) => {
                        if self.await_auth_retry(kind, &provider).await.is_none() {
                            return;
                        }
                        self.emit(MapEvent::Saving { provider: provider.clone(), progress: None });
                        result = adapter.save_map(&info, true, &progress).await;
                    }
                    FailureKind::NetworkError => {
                        self.offer_local_save(&info, &error, &provider).await;
                        return;
                    }
                    kind => {
                        self.emit(MapEvent::SaveFailed {
                            reason: kind,
                            label: label(&error, &provider),
                            store_locally: None,
                        });
                        return;
                    }
                },
            }
        }
    }

    /// Emit the auth event matching `kind` and wait for the manual retry.
    ///
    /// Returns `None` when the caller dropped the handle without retrying.
    async fn await_auth_retry(&self, kind: FailureKind, provider: &str) -> Option<()> {
        let (retry, resumed) = RetryHandle::channel();
        let provider = provider.to_string();
        let event = if kind == FailureKind::FailedAuthentication {
            MapEvent::AuthorisationFailed { provider, retry }
        } else {
            MapEvent::AuthRequired { provider, retry }
        };
        self.emit(event);
        match resumed.await {
            Ok(()) => Some(()),
            Err(_) => {
                debug!(reason = %kind, "auth retry abandoned");
                None
            }
        }
    }

    /// Offer the degraded local-save continuation after a network failure.
    async fn offer_local_save(&self, info: &MapInfo, error: &MapVaultError, provider: &str) {
        let (store_locally, resumed) = StoreLocallyHandle::channel();
        self.emit(MapEvent::SaveFailed {
            reason: error.kind(),
            label: label(error, provider),
            store_locally: Some(store_locally),
        });
        if resumed.await.is_err() {
            debug!(%provider, "local save offer abandoned");
            return;
        }

        match self.fallback.put(&info.map_id, &info.document).await {
            Ok(()) => self.emit(MapEvent::Saved {
                map_id: info.map_id.clone(),
                document: info.document.clone(),
                id_changed: false,
            }),
            Err(error) => self.emit(MapEvent::SaveFailed {
                reason: error.kind(),
                label: error.to_string(),
                store_locally: None,
            }),
        }
    }

    fn load_progress(&self, map_id: &MapId) -> ProgressSink {
        let events = self.events.clone();
        let map_id = map_id.clone();
        ProgressSink::new(move |update| {
            let _ = events.send(MapEvent::Loading {
                map_id: map_id.clone(),
                progress: Some(update.message()),
            });
        })
    }

    fn save_progress(&self, provider: &str) -> ProgressSink {
        let events = self.events.clone();
        let provider = provider.to_string();
        ProgressSink::new(move |update| {
            let _ = events.send(MapEvent::Saving {
                provider: provider.clone(),
                progress: Some(update.message()),
            });
        })
    }

    fn install(&self, info: MapInfo) {
        *self.lock_current() = Some(info);
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<MapInfo>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: MapEvent) {
        if self.events.send(event).is_err() {
            debug!("event receiver dropped, discarding event");
        }
    }
}

fn label(error: &MapVaultError, description: &str) -> String {
    format!("{error} [{description}]")
}
