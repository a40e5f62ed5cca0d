//! Shared test doubles for the orchestration tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mapvault_core::events::MapEvent;
use mapvault_core::{
    AdapterRegistry, EmbeddedMaps, KeyValueStore, MapRepository, OfflineFallbackStore,
    ProgressSink, StorageAdapter,
};
use mapvault_domain::{
    AdapterPayload, Document, MapId, MapInfo, MapVaultError, RepositoryConfig, Result,
};
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;

/// Scriptable storage backend recording every call it receives.
pub struct StubAdapter {
    prefix: String,
    description: String,
    not_sharable: bool,
    load_script: Mutex<VecDeque<Result<AdapterPayload>>>,
    save_script: Mutex<VecDeque<Result<MapInfo>>>,
    load_requests: Mutex<Vec<(MapId, bool)>>,
    save_requests: Mutex<Vec<(MapInfo, bool)>>,
}

impl StubAdapter {
    pub fn new(prefix: &str, description: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            description: description.to_string(),
            not_sharable: false,
            load_script: Mutex::new(VecDeque::new()),
            save_script: Mutex::new(VecDeque::new()),
            load_requests: Mutex::new(Vec::new()),
            save_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn not_sharable(mut self) -> Self {
        self.not_sharable = true;
        self
    }

    pub fn push_load(&self, result: Result<AdapterPayload>) {
        self.load_script.lock().unwrap().push_back(result);
    }

    pub fn push_save(&self, result: Result<MapInfo>) {
        self.save_script.lock().unwrap().push_back(result);
    }

    pub fn load_attempts(&self) -> usize {
        self.load_requests.lock().unwrap().len()
    }

    pub fn save_attempts(&self) -> usize {
        self.save_requests.lock().unwrap().len()
    }

    /// The `(map_id, interactive)` pairs seen by `load_map`, in order.
    pub fn load_requests(&self) -> Vec<(MapId, bool)> {
        self.load_requests.lock().unwrap().clone()
    }

    /// The `(info, interactive)` pairs seen by `save_map`, in order.
    pub fn save_requests(&self) -> Vec<(MapInfo, bool)> {
        self.save_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageAdapter for StubAdapter {
    fn recognizes(&self, map_id: &MapId) -> bool {
        map_id.as_str().starts_with(&self.prefix)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn not_sharable(&self) -> bool {
        self.not_sharable
    }

    async fn load_map(
        &self,
        map_id: &MapId,
        interactive: bool,
        _progress: &ProgressSink,
    ) -> Result<AdapterPayload> {
        self.load_requests.lock().unwrap().push((map_id.clone(), interactive));
        self.load_script.lock().unwrap().pop_front().expect("load script exhausted")
    }

    async fn save_map(
        &self,
        info: &MapInfo,
        interactive: bool,
        _progress: &ProgressSink,
    ) -> Result<MapInfo> {
        self.save_requests.lock().unwrap().push((info.clone(), interactive));
        self.save_script.lock().unwrap().pop_front().expect("save script exhausted")
    }
}

/// In-memory key-value store with a switchable write failure.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
    fail_puts: AtomicBool,
}

impl MemoryKv {
    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(MapVaultError::LocalStorage("quota exceeded".into()));
        }
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Repository under test plus handles to everything it talks to.
pub struct Fixture {
    pub repo: Arc<MapRepository>,
    pub events: UnboundedReceiver<MapEvent>,
    pub adapter: Arc<StubAdapter>,
    pub kv: Arc<MemoryKv>,
}

pub fn fixture(adapter: StubAdapter) -> Fixture {
    fixture_with(adapter, EmbeddedMaps::new())
}

pub fn fixture_with(adapter: StubAdapter, embedded: EmbeddedMaps) -> Fixture {
    let adapter = Arc::new(adapter);
    let kv = Arc::new(MemoryKv::default());
    let registry =
        AdapterRegistry::new(vec![Arc::clone(&adapter) as Arc<dyn StorageAdapter>]).unwrap();
    let fallback = OfflineFallbackStore::new(Arc::clone(&kv) as Arc<dyn KeyValueStore>);
    let (repo, events) =
        MapRepository::new(registry, fallback, embedded, RepositoryConfig::default());
    Fixture { repo: Arc::new(repo), events, adapter, kv }
}

/// Cache a document in the fallback store the way a degraded save would.
pub async fn seed_fallback(kv: &Arc<MemoryKv>, map_id: &MapId, document: &Document) {
    let fallback = OfflineFallbackStore::new(Arc::clone(kv) as Arc<dyn KeyValueStore>);
    fallback.put(map_id, document).await.unwrap();
}

pub fn document(title: &str) -> Document {
    Document::from_value(json!({"id": 1, "title": title}))
}

pub fn payload(title: &str) -> AdapterPayload {
    AdapterPayload::json(json!({"id": 1, "title": title}).to_string())
}

pub fn network_error() -> MapVaultError {
    MapVaultError::Network("connection reset".into())
}

/// Receive the next event, failing loudly instead of hanging forever.
pub async fn next_event(events: &mut UnboundedReceiver<MapEvent>) -> MapEvent {
    tokio::time::timeout(Duration::from_secs(60), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Skip progress-bearing `Loading`/`Saving` events, returning the first
/// event that is anything else.
pub async fn next_non_progress_event(events: &mut UnboundedReceiver<MapEvent>) -> MapEvent {
    loop {
        match next_event(events).await {
            MapEvent::Loading { progress: Some(_), .. }
            | MapEvent::Saving { progress: Some(_), .. } => continue,
            event => return event,
        }
    }
}
