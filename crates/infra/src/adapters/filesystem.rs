//! Local filesystem storage backend
//!
//! Stores each map as a JSON file under a root directory. Identifiers carry
//! the `file-` prefix followed by the file stem; loading also probes for a
//! legacy `.mm` FreeMind export with the same stem and reports it with the
//! FreeMind content kind so the orchestrator runs the import.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mapvault_core::{ProgressSink, ProgressUpdate, StorageAdapter};
use mapvault_domain::{AdapterPayload, MapId, MapInfo, MapVaultError, MimeKind, Result};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

const ID_PREFIX: &str = "file-";

pub struct FileSystemAdapter {
    root: PathBuf,
}

impl FileSystemAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validated file stem for an identifier this adapter recognizes.
    ///
    /// Rejects stems that could escape the root directory.
    fn stem(&self, map_id: &MapId) -> Result<String> {
        let stem = map_id
            .as_str()
            .strip_prefix(ID_PREFIX)
            .ok_or_else(|| {
                MapVaultError::InvalidInput(format!("not a filesystem identifier: {map_id}"))
            })?;
        if stem.is_empty() || stem.contains(['/', '\\']) || stem.contains("..") {
            return Err(MapVaultError::InvalidInput(format!(
                "unsafe filesystem identifier: {map_id}"
            )));
        }
        Ok(stem.to_string())
    }

    fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        self.root.join(format!("{stem}.{extension}"))
    }

    async fn read_payload(&self, path: &Path, mime: MimeKind) -> Result<Option<AdapterPayload>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(AdapterPayload::new(content, mime))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MapVaultError::Internal(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl StorageAdapter for FileSystemAdapter {
    fn recognizes(&self, map_id: &MapId) -> bool {
        map_id.as_str().starts_with(ID_PREFIX)
    }

    fn description(&self) -> &str {
        "local files"
    }

    fn not_sharable(&self) -> bool {
        true
    }

    async fn load_map(
        &self,
        map_id: &MapId,
        _interactive: bool,
        progress: &ProgressSink,
    ) -> Result<AdapterPayload> {
        let stem = self.stem(map_id)?;
        let native = self.path_for(&stem, "json");
        let payload = match self.read_payload(&native, MimeKind::Json).await? {
            Some(payload) => payload,
            None => {
                let legacy = self.path_for(&stem, "mm");
                self.read_payload(&legacy, MimeKind::Freemind)
                    .await?
                    .ok_or_else(|| {
                        MapVaultError::Internal(format!("no such map: {map_id}"))
                    })?
            }
        };
        let total = payload.content.len() as u64;
        progress.report(ProgressUpdate::Transferred { done: total, total });
        Ok(payload)
    }

    async fn save_map(
        &self,
        info: &MapInfo,
        _interactive: bool,
        progress: &ProgressSink,
    ) -> Result<MapInfo> {
        let map_id = if info.map_id.is_new() || !self.recognizes(&info.map_id) {
            let assigned = MapId::new(format!("{ID_PREFIX}{}", Uuid::new_v4().simple()));
            debug!(map_id = %assigned, "assigning new filesystem identity");
            assigned
        } else {
            info.map_id.clone()
        };
        let stem = self.stem(&map_id)?;
        let content = serde_json::to_string_pretty(info.document.as_value())
            .map_err(|e| MapVaultError::Internal(format!("cannot serialise document: {e}")))?;
        let path = self.path_for(&stem, "json");
        fs::write(&path, &content).await.map_err(|e| {
            MapVaultError::Internal(format!("cannot write {}: {e}", path.display()))
        })?;
        let total = content.len() as u64;
        progress.report(ProgressUpdate::Transferred { done: total, total });
        Ok(MapInfo::new(map_id, info.document.clone()))
    }
}
