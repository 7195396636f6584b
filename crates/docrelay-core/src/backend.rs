//! Backend selection enums for the object store and the notification queue.

use std::fmt;
use std::str::FromStr;

/// Object-store backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    S3,
    Local,
}

impl FromStr for StorageBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(StorageBackendKind::S3),
            "local" => Ok(StorageBackendKind::Local),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

impl fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackendKind::S3 => write!(f, "s3"),
            StorageBackendKind::Local => write!(f, "local"),
        }
    }
}

/// Notification-queue backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueBackendKind {
    Sqs,
    Memory,
}

impl FromStr for QueueBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqs" => Ok(QueueBackendKind::Sqs),
            "memory" => Ok(QueueBackendKind::Memory),
            other => Err(format!("unknown queue backend: {}", other)),
        }
    }
}

impl fmt::Display for QueueBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueBackendKind::Sqs => write!(f, "sqs"),
            QueueBackendKind::Memory => write!(f, "memory"),
        }
    }
}
