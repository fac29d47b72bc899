/// Storage backends
///
/// A backend persists raw JSON values under a collection key. It knows nothing
/// about defaults or record shapes; [`super::CollectionStore`] layers those on top.
///
/// # Implementations
///
/// - [`JsonFileBackend`]: one pretty-printed `<key>.json` file per collection
/// - [`MemoryBackend`]: in-process map, used by tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::StoreError;

/// Persistence seam for collections
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    /// Human-readable location, for logs
    fn describe(&self) -> String;

    /// Ensures the backing storage exists
    async fn prepare(&self) -> Result<(), StoreError>;

    /// Loads a collection, `None` when it has never been written
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replaces a collection
    async fn save(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}

/// Backend storing each collection as `<dir>/<key>.json`
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so a reader sees either the old or the new contents.
#[derive(Debug)]
pub struct JsonFileBackend {
    dir: PathBuf,
    seq: AtomicU64,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seq: AtomicU64::new(0),
        }
    }

    /// Data directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{key}.json.{}.{seq}.tmp", std::process::id()))
    }
}

#[async_trait]
impl CollectionBackend for JsonFileBackend {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    async fn prepare(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        debug!(dir = %self.dir.display(), "Data directory ready");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        trace!(path = %path.display(), "Loading collection");

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let value = serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            collection: key.to_string(),
            source,
        })?;

        Ok(Some(value))
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = self.temp_path_for(key);

        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode {
            collection: key.to_string(),
            source,
        })?;

        if let Err(source) = fs::write(&tmp, json).await {
            return Err(StoreError::Io { path: tmp, source });
        }

        if let Err(source) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Io { path, source });
        }

        trace!(path = %path.display(), "Collection saved");
        Ok(())
    }
}

/// Backend keeping collections in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RwLock<HashMap<String, Value>>,
    saves: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollectionBackend for MemoryBackend {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn prepare(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
