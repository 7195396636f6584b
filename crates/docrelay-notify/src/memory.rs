use crate::traits::{MessageHandle, NotifyError, NotifyQueue, NotifyResult};
use crate::QueueBackendKind;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory queue implementation.
///
/// Used for development and tests. Messages accumulate in process memory;
/// nothing consumes them. `Clone` shares the underlying buffer so a test can
/// keep a handle and inspect what the service sent.
#[derive(Clone, Default)]
pub struct MemoryQueue {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every payload sent so far, in order.
    pub fn sent(&self) -> Vec<String> {
        self.messages.lock().expect("queue mutex poisoned").clone()
    }
}

#[async_trait]
impl NotifyQueue for MemoryQueue {
    async fn send(&self, payload: &str) -> NotifyResult<MessageHandle> {
        let mut messages = self
            .messages
            .lock()
            .map_err(|e| NotifyError::Permanent(format!("queue mutex poisoned: {}", e)))?;
        messages.push(payload.to_string());

        let message_id = Uuid::new_v4().to_string();
        tracing::debug!(
            message_id = %message_id,
            queued = messages.len(),
            "memory queue send"
        );
        Ok(MessageHandle { message_id })
    }

    fn backend_kind(&self) -> QueueBackendKind {
        QueueBackendKind::Memory
    }
}
