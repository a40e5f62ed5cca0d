//! Single-file JSON key-value store
//!
//! Persists the whole map as one pretty-printed JSON object and rewrites it
//! atomically (temp file + rename) on every change. The orchestrators are
//! the only writers, so read-modify-write without file locking is safe; the
//! entry count is tiny (one per pending offline fallback).

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;

use async_trait::async_trait;
use mapvault_core::KeyValueStore;
use mapvault_domain::{MapVaultError, Result};
use tokio::fs;

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_entries(&self) -> Result<HashMap<String, String>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| storage_err(format_args!("corrupt store file: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(storage_err(e)),
        }
    }

    async fn write_entries(&self, entries: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(entries).map_err(storage_err)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, raw).await.map_err(storage_err)?;
        fs::rename(&staging, &self.path).await.map_err(storage_err)?;
        Ok(())
    }
}

fn storage_err(detail: impl Display) -> MapVaultError {
    MapVaultError::LocalStorage(detail.to_string())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries().await?.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}
