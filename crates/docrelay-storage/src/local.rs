use crate::traits::{validate_key, ObjectStore, PutResult, StorageError, StorageResult};
use crate::StorageBackendKind;
use async_trait::async_trait;
use bytes::Bytes;
use docrelay_core::AttributeSet;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

async fn write_then_rename(tmp: &Path, target: &Path, data: &Bytes) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(data).await?;
    file.flush().await?;
    fs::rename(tmp, target).await
}

/// Local filesystem object-store implementation.
///
/// Used for development and tests. The etag is the hex sha256 of the
/// content, which gives the same stable-identity property as S3's etag
/// without a remote call. Writes go through a temp file + rename so a
/// failed put never leaves a half-written object visible.
#[derive(Clone)]
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at `base_path` (created if absent).
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore { base_path })
    }

    /// Convert a storage key to a filesystem path. Keys are validated
    /// against traversal before joining.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Permanent(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        _content_type: &str,
        _metadata: &AttributeSet,
    ) -> StorageResult<PutResult> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let etag = hex::encode(Sha256::digest(&data));

        // Unique per call so concurrent puts to distinct keys (or the same
        // key) never share a temp file.
        let tmp_path = path.with_file_name(format!(
            "{}.tmp-{}",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("object"),
            Uuid::new_v4().simple()
        ));
        if let Err(e) = write_then_rename(&tmp_path, &path, &data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Permanent(e.to_string()));
        }

        tracing::info!(
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "local put successful"
        );

        Ok(PutResult {
            etag,
            version_id: None,
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Permanent(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Permanent(e.to_string())),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Permanent(e.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.base_path.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::Permanent(e.to_string())),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::Permanent(e.to_string()))?
            {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                if let Ok(relative) = path.strip_prefix(&self.base_path) {
                    let key = relative.to_string_lossy().replace('\\', "/");
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }

    fn backend_kind(&self) -> StorageBackendKind {
        StorageBackendKind::Local
    }
}
