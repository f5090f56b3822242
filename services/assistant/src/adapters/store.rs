//! services/assistant/src/adapters/store.rs
//!
//! Concrete implementations of the `KeyValueStore` port: a durable store
//! backed by one JSON file, and a process-local store used when no durable
//! storage is available.

use async_trait::async_trait;
use chrono::Utc;
use learning_assistant_core::ports::{KeyValueStore, PortError, PortResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};

//=========================================================================================
// File-backed Store
//=========================================================================================

/// Keeps every key in a single JSON object on disk. Each write replaces the
/// whole file through a temporary file and a rename.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens (or creates) the store file inside `data_dir`.
    pub async fn open(data_dir: &Path) -> PortResult<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to create {:?}: {}", data_dir, e)))?;
        let path = data_dir.join("store.json");

        let entries: BTreeMap<String, String> = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    set_aside(&path, &e).await?;
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(PortError::Unexpected(format!(
                    "Failed to read {:?}: {}",
                    path, e
                )))
            }
        };
        info!("Opened key-value store at {:?} ({} keys)", path, entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> PortResult<()> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to write {:?}: {}", tmp, e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to replace {:?}: {}", self.path, e)))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    /// The in-memory map only changes once the file write succeeded.
    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }
}

/// Moves an unparseable store file out of the way so the next write cannot
/// overwrite it.
async fn set_aside(path: &Path, reason: &serde_json::Error) -> PortResult<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("store.json");
    let backup = path.with_file_name(format!(
        "{}.corrupt-{}",
        file_name,
        Utc::now().format("%Y%m%d%H%M%S%3f")
    ));
    tokio::fs::rename(path, &backup).await.map_err(|e| {
        PortError::Unexpected(format!("Failed to move aside {:?}: {}", path, e))
    })?;
    warn!(
        "Store file {:?} is unreadable ({}), moved to {:?}; starting empty",
        path, reason, backup
    );
    Ok(())
}

//=========================================================================================
// In-memory Store
//=========================================================================================

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
