//! Object-store abstraction trait.

use async_trait::async_trait;
use bytes::Bytes;
use docrelay_core::{AttributeSet, StorageBackendKind};
use thiserror::Error;

/// Storage operation errors, classified for retry decisions.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Timeout, throttling, 5xx: a retry may succeed.
    #[error("transient storage error: {0}")]
    Transient(String),

    /// Invalid bucket, oversized payload, 4xx: retrying is pointless.
    #[error("permanent storage error: {0}")]
    Permanent(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("storage configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether a bounded retry of the same operation is worthwhile.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transient(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result of one durable write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutResult {
    pub etag: String,
    pub version_id: Option<String>,
}

/// Object-store abstraction.
///
/// All backends (S3, local filesystem) implement this trait so the
/// coordinator and the sweeper never couple to a concrete client.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Durably write one object. Relies on the backend's atomic-put
    /// semantics: a failed put leaves nothing half-written visible.
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &AttributeSet,
    ) -> StorageResult<PutResult>;

    /// Read an object by key.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Delete an object by key.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// List object keys under a prefix.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Get the storage backend kind
    fn backend_kind(&self) -> StorageBackendKind;
}

/// Reject keys that could escape the store's namespace.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.contains("..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
