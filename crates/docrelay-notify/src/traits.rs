//! Notification-queue abstraction trait.

use async_trait::async_trait;
use docrelay_core::QueueBackendKind;
use thiserror::Error;

/// Messaging operation errors, classified for retry decisions.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Timeout, throttling, 5xx: a retry may succeed.
    #[error("transient messaging error: {0}")]
    Transient(String),

    /// Invalid queue, oversized message, 4xx: retrying is pointless.
    #[error("permanent messaging error: {0}")]
    Permanent(String),

    /// The notification payload could not be serialized. Treated as
    /// permanent: the same payload will fail the same way on retry.
    #[error("notification serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("queue configuration error: {0}")]
    ConfigError(String),
}

impl NotifyError {
    /// Whether a bounded retry of the same send is worthwhile.
    pub fn is_transient(&self) -> bool {
        matches!(self, NotifyError::Transient(_))
    }
}

/// Result type for messaging operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Handle returned for a successfully enqueued message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub message_id: String,
}

/// Notification-queue abstraction.
///
/// Backends receive an already-serialized payload; serialization lives in
/// the dispatcher so every backend sends the identical wire format.
#[async_trait]
pub trait NotifyQueue: Send + Sync {
    /// Enqueue one message. At-least-once: a send that errors after the
    /// broker accepted it may be duplicated by the caller's retry, which
    /// consumers must tolerate.
    async fn send(&self, payload: &str) -> NotifyResult<MessageHandle>;

    /// Get the queue backend kind
    fn backend_kind(&self) -> QueueBackendKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(NotifyError::Transient("throttled".into()).is_transient());
        assert!(!NotifyError::Permanent("no such queue".into()).is_transient());
        let ser_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(!NotifyError::from(ser_err).is_transient());
    }
}
